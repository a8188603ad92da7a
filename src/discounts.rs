//! Discounts
//!
//! Item discounts change how a single basket line is totalled. Basket discounts deduct a share
//! of the amount that is still eligible once item discounts have been applied. Both are closed
//! sets; persistence stores a numeric tag plus an amount.

use std::num::NonZeroU64;

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while constructing or applying discounts.
#[derive(Debug, Error, PartialEq)]
pub enum DiscountError {
    /// A flat amount discount must take something off.
    #[error("discount amount must be greater than zero")]
    NonPositiveAmount,

    /// Basket percentages are bounded to `(0, 100]`.
    #[error("percentage {0} must be greater than 0 and no more than 100")]
    PercentageOutOfRange(Decimal),

    /// A basket discount needs a code to be referenced by.
    #[error("discount code is required")]
    EmptyCode,

    /// A persisted item discount tag has no matching variant.
    #[error("item discount type {0} is not supported")]
    UnsupportedType(u8),

    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,
}

/// Persisted tag of an [`ItemDiscount`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ItemDiscountType {
    /// [`ItemDiscount::FlatAmount`]
    FlatAmount = 1,

    /// [`ItemDiscount::BuyOneGetOneFree`]
    BuyOneGetOneFree = 2,
}

impl TryFrom<u8> for ItemDiscountType {
    type Error = DiscountError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::FlatAmount),
            2 => Ok(Self::BuyOneGetOneFree),
            other => Err(DiscountError::UnsupportedType(other)),
        }
    }
}

impl From<ItemDiscountType> for u8 {
    fn from(value: ItemDiscountType) -> Self {
        value as u8
    }
}

/// Per-line pricing rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemDiscount {
    /// Take a fixed amount off every unit (e.g., "50p off").
    FlatAmount {
        /// Amount taken off each unit, in minor units.
        amount_taken: NonZeroU64,
    },

    /// Every second unit in a pair is free.
    BuyOneGetOneFree,
}

impl ItemDiscount {
    /// Create a flat amount discount.
    ///
    /// # Errors
    ///
    /// Returns [`DiscountError::NonPositiveAmount`] when `amount_taken` is zero.
    pub fn flat_amount(amount_taken: u64) -> Result<Self, DiscountError> {
        NonZeroU64::new(amount_taken)
            .map(|amount_taken| Self::FlatAmount { amount_taken })
            .ok_or(DiscountError::NonPositiveAmount)
    }

    /// Calculate the line total for `quantity` units at `unit_price`.
    ///
    /// Returns `None` if the total does not fit in a `u64`.
    pub fn calculate_total(self, unit_price: u64, quantity: u32) -> Option<u64> {
        match self {
            Self::FlatAmount { amount_taken } => unit_price
                .saturating_sub(amount_taken.get())
                .checked_mul(u64::from(quantity)),
            Self::BuyOneGetOneFree => {
                let payable = quantity / 2 + quantity % 2;

                unit_price.checked_mul(u64::from(payable))
            }
        }
    }

    /// Human readable description shown alongside the item.
    pub fn description(self) -> String {
        match self {
            Self::FlatAmount { amount_taken } => format!("Flat amount off {amount_taken}p"),
            Self::BuyOneGetOneFree => "Buy one get one free".to_string(),
        }
    }

    /// Tag used when persisting the discount.
    pub fn discount_type(self) -> ItemDiscountType {
        match self {
            Self::FlatAmount { .. } => ItemDiscountType::FlatAmount,
            Self::BuyOneGetOneFree => ItemDiscountType::BuyOneGetOneFree,
        }
    }

    /// Split into the persisted `(tag, amount)` pair.
    pub fn to_persisted(self) -> (u8, u64) {
        let amount = match self {
            Self::FlatAmount { amount_taken } => amount_taken.get(),
            Self::BuyOneGetOneFree => 0,
        };

        (self.discount_type().into(), amount)
    }

    /// Rebuild a discount from its persisted `(tag, amount)` pair.
    ///
    /// # Errors
    ///
    /// - [`DiscountError::UnsupportedType`]: the tag is unknown.
    /// - [`DiscountError::NonPositiveAmount`]: a flat amount row has no positive amount.
    pub fn from_persisted(tag: u8, amount: Option<u64>) -> Result<Self, DiscountError> {
        match ItemDiscountType::try_from(tag)? {
            ItemDiscountType::FlatAmount => Self::flat_amount(amount.unwrap_or_default()),
            ItemDiscountType::BuyOneGetOneFree => Ok(Self::BuyOneGetOneFree),
        }
    }
}

/// Basket-wide percentage reduction identified by a code.
///
/// The percentage is held in points (`12.5` means 12.5%). Its bounds are checked once, here;
/// whether the code is still honoured is decided by its discount definition at pricing time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PercentageDiscountData")]
pub struct PercentageDiscount {
    code: String,
    percentage: Decimal,
}

#[derive(Deserialize)]
struct PercentageDiscountData {
    code: String,
    percentage: Decimal,
}

impl TryFrom<PercentageDiscountData> for PercentageDiscount {
    type Error = DiscountError;

    fn try_from(data: PercentageDiscountData) -> Result<Self, Self::Error> {
        Self::new(data.code, data.percentage)
    }
}

impl PercentageDiscount {
    /// Create a percentage discount.
    ///
    /// # Errors
    ///
    /// - [`DiscountError::EmptyCode`]: `code` is blank.
    /// - [`DiscountError::PercentageOutOfRange`]: `percentage` is outside `(0, 100]`.
    pub fn new(code: impl Into<String>, percentage: Decimal) -> Result<Self, DiscountError> {
        let code = code.into();

        if code.trim().is_empty() {
            return Err(DiscountError::EmptyCode);
        }

        if percentage <= Decimal::ZERO || percentage > Decimal::ONE_HUNDRED {
            return Err(DiscountError::PercentageOutOfRange(percentage));
        }

        Ok(Self { code, percentage })
    }

    /// Discount code.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Percentage points taken off.
    pub fn percentage(&self) -> Decimal {
        self.percentage
    }

    /// The percentage as a fraction.
    pub fn rate(&self) -> Percentage {
        Percentage::from(self.percentage / Decimal::ONE_HUNDRED)
    }

    /// Calculate the deduction for an eligible amount, rounded half away from zero.
    ///
    /// The result is not clamped; callers cap it at `eligible_amount`.
    ///
    /// # Errors
    ///
    /// Returns [`DiscountError::PercentConversion`] if the result cannot be represented.
    pub fn calculate_discount(&self, eligible_amount: u64) -> Result<u64, DiscountError> {
        percent_of_minor(&self.rate(), eligible_amount)
    }
}

/// Discount applied to the basket as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BasketDiscount {
    /// Percentage off the eligible amount.
    Percentage(PercentageDiscount),
}

impl BasketDiscount {
    /// Code the discount was applied with.
    pub fn code(&self) -> &str {
        match self {
            Self::Percentage(discount) => discount.code(),
        }
    }
}

impl From<PercentageDiscount> for BasketDiscount {
    fn from(discount: PercentageDiscount) -> Self {
        Self::Percentage(discount)
    }
}

/// Calculate `percent` of a minor unit amount, rounded to the nearest minor unit with midpoints
/// rounded away from zero.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the calculation overflows or the result is
/// negative.
pub fn percent_of_minor(percent: &Percentage, minor: u64) -> Result<u64, DiscountError> {
    ((*percent) * Decimal::ONE) // decimal_percentage doesn't expose the underlying Decimal
        .checked_mul(Decimal::from(minor))
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        .ok_or(DiscountError::PercentConversion)
}
