//! Discount Definitions

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    discounts::{DiscountError, PercentageDiscount},
    uuids::TypedUuid,
};

/// Discount Definition UUID
pub type DiscountDefinitionUuid = TypedUuid<DiscountDefinition>;

/// Catalog record backing a discount code.
///
/// Baskets only hold the definition's uuid; the record itself is looked up whenever totals are
/// calculated, so deactivating it takes effect without touching any basket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountDefinition {
    /// Definition identity.
    pub uuid: DiscountDefinitionUuid,

    /// Unique discount code.
    pub code: String,

    /// Percentage points taken off, when set.
    pub percentage: Option<Decimal>,

    /// Free-form metadata.
    pub metadata: Option<String>,

    /// Whether the code is currently honoured.
    pub is_active: bool,
}

impl DiscountDefinition {
    /// Active with a positive percentage.
    pub fn is_usable(&self) -> bool {
        self.is_active && self.percentage.is_some_and(|p| p > Decimal::ZERO)
    }

    /// Build the basket discount this definition describes.
    ///
    /// Returns `Ok(None)` for definitions that are not usable.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountError`] if a usable definition holds a percentage above 100 or a blank
    /// code.
    pub fn to_discount(&self) -> Result<Option<PercentageDiscount>, DiscountError> {
        match self.percentage {
            Some(percentage) if self.is_usable() => {
                PercentageDiscount::new(self.code.clone(), percentage).map(Some)
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn definition(percentage: Option<Decimal>, is_active: bool) -> DiscountDefinition {
        DiscountDefinition {
            uuid: DiscountDefinitionUuid::new(),
            code: "SAVE10".to_string(),
            percentage,
            metadata: None,
            is_active,
        }
    }

    #[test]
    fn usable_requires_active_and_positive_percentage() {
        assert!(definition(Some(Decimal::from(10)), true).is_usable());
        assert!(!definition(Some(Decimal::from(10)), false).is_usable());
        assert!(!definition(Some(Decimal::ZERO), true).is_usable());
        assert!(!definition(None, true).is_usable());
    }

    #[test]
    fn to_discount_for_usable_definition() -> TestResult {
        let discount = definition(Some(Decimal::from(10)), true).to_discount()?;

        assert_eq!(
            discount,
            Some(PercentageDiscount::new("SAVE10", Decimal::from(10))?)
        );

        Ok(())
    }

    #[test]
    fn to_discount_for_inactive_definition_is_none() -> TestResult {
        assert_eq!(
            definition(Some(Decimal::from(10)), false).to_discount()?,
            None
        );

        Ok(())
    }

    #[test]
    fn to_discount_rejects_out_of_range_percentage() {
        assert_eq!(
            definition(Some(Decimal::from(150)), true).to_discount(),
            Err(DiscountError::PercentageOutOfRange(Decimal::from(150)))
        );
    }
}
