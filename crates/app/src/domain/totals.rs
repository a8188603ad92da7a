//! Totals

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;
use tracing::Span;
use trolley::{
    basket::Basket,
    definitions::DiscountDefinition,
    pricing::{PricingError, Totals, calculate_totals},
};

use crate::domain::discounts::{DiscountCatalog, DiscountCatalogError};

#[derive(Debug, Error)]
pub enum TotalsError {
    #[error("failed to resolve basket discount")]
    Catalog(#[from] DiscountCatalogError),

    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Prices baskets against the live discount catalog.
#[derive(Clone)]
pub struct CatalogTotalsCalculator {
    catalog: Arc<dyn DiscountCatalog>,
}

impl CatalogTotalsCalculator {
    #[must_use]
    pub fn new(catalog: Arc<dyn DiscountCatalog>) -> Self {
        Self { catalog }
    }
}

impl std::fmt::Debug for CatalogTotalsCalculator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogTotalsCalculator")
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TotalsCalculator for CatalogTotalsCalculator {
    #[tracing::instrument(
        name = "totals.calculator.calculate",
        skip(self, basket),
        fields(
            basket_uuid = %basket.uuid(),
            discount_applied = tracing::field::Empty
        ),
        err
    )]
    async fn calculate(&self, basket: &Basket) -> Result<Totals, TotalsError> {
        let definition = self
            .catalog
            .get_active_definition(basket.discount_definition())
            .await?;

        let discount = definition
            .as_ref()
            .map(DiscountDefinition::to_discount)
            .transpose()
            .map_err(PricingError::from)?
            .flatten();

        Span::current().record("discount_applied", discount.is_some());

        Ok(calculate_totals(basket, discount.as_ref())?)
    }
}

#[automock]
#[async_trait]
pub trait TotalsCalculator: Send + Sync {
    /// Calculate totals for a basket snapshot.
    async fn calculate(&self, basket: &Basket) -> Result<Totals, TotalsError>;
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;
    use rust_decimal::Decimal;
    use testresult::TestResult;
    use trolley::{
        definitions::DiscountDefinitionUuid, discounts::PercentageDiscount, items::Item,
    };

    use crate::domain::discounts::MockDiscountCatalog;

    use super::*;

    fn definition(uuid: DiscountDefinitionUuid, percentage: i64) -> DiscountDefinition {
        DiscountDefinition {
            uuid,
            code: "SAVE10".to_string(),
            percentage: Some(Decimal::from(percentage)),
            metadata: None,
            is_active: true,
        }
    }

    fn basket_with_discount(uuid: DiscountDefinitionUuid) -> TestResult<Basket> {
        let mut basket = Basket::new();

        basket.add_or_update_item(Item::new("Coffee", 500, 2, None)?)?;
        basket.apply_discount(
            PercentageDiscount::new("SAVE10", Decimal::from(10))?.into(),
            Some(uuid),
        );

        Ok(basket)
    }

    #[tokio::test]
    async fn applies_live_definition() -> TestResult {
        let uuid = DiscountDefinitionUuid::new();
        let basket = basket_with_discount(uuid)?;

        let mut catalog = MockDiscountCatalog::new();

        catalog
            .expect_get_active_definition()
            .with(eq(Some(uuid)))
            .times(1)
            .returning(move |_| Ok(Some(definition(uuid, 10))));

        let totals = CatalogTotalsCalculator::new(Arc::new(catalog))
            .calculate(&basket)
            .await?;

        assert_eq!(totals.discount, 100);
        assert_eq!(totals.total_without_vat, 900);

        Ok(())
    }

    #[tokio::test]
    async fn live_percentage_wins_over_attached_discount() -> TestResult {
        let uuid = DiscountDefinitionUuid::new();
        let basket = basket_with_discount(uuid)?;

        let mut catalog = MockDiscountCatalog::new();

        catalog
            .expect_get_active_definition()
            .returning(move |_| Ok(Some(definition(uuid, 25))));

        let totals = CatalogTotalsCalculator::new(Arc::new(catalog))
            .calculate(&basket)
            .await?;

        assert_eq!(totals.discount, 250);

        Ok(())
    }

    #[tokio::test]
    async fn unusable_definition_means_no_discount() -> TestResult {
        let basket = basket_with_discount(DiscountDefinitionUuid::new())?;

        let mut catalog = MockDiscountCatalog::new();

        catalog
            .expect_get_active_definition()
            .returning(|_| Ok(None));

        let totals = CatalogTotalsCalculator::new(Arc::new(catalog))
            .calculate(&basket)
            .await?;

        assert_eq!(totals.discount, 0);
        assert_eq!(totals.total_with_vat, 1_200);

        Ok(())
    }

    #[tokio::test]
    async fn out_of_range_definition_is_a_pricing_error() -> TestResult {
        let uuid = DiscountDefinitionUuid::new();
        let basket = basket_with_discount(uuid)?;

        let mut catalog = MockDiscountCatalog::new();

        catalog
            .expect_get_active_definition()
            .returning(move |_| Ok(Some(definition(uuid, 150))));

        let result = CatalogTotalsCalculator::new(Arc::new(catalog))
            .calculate(&basket)
            .await;

        assert!(
            matches!(result, Err(TotalsError::Pricing(PricingError::Discount(_)))),
            "expected Pricing, got {result:?}"
        );

        Ok(())
    }
}
