//! Pricing
//!
//! Turns a basket snapshot into its reported totals. Nothing here is stored; totals are
//! recalculated on every read because the basket discount is resolved from its live definition.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    basket::Basket,
    discounts::{DiscountError, PercentageDiscount, percent_of_minor},
    items::Item,
};

/// Errors that can occur while calculating totals.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// A monetary figure does not fit in a `u64`.
    #[error("monetary amount overflowed")]
    Overflow,

    /// Percentage conversion failed.
    #[error(transparent)]
    Discount(#[from] DiscountError),
}

/// Flat VAT rate applied to goods net of discount.
pub fn vat_rate() -> Percentage {
    Percentage::from(Decimal::new(20, 2))
}

/// Reported monetary figures of a basket, all in minor units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Sum of line totals, item discounts included.
    pub subtotal: u64,

    /// Basket discount taken off the eligible amount.
    pub discount: u64,

    /// Shipping cost.
    pub shipping: u64,

    /// Subtotal less discount plus shipping.
    pub total_without_vat: u64,

    /// VAT on goods net of discount.
    pub vat_amount: u64,

    /// Total including VAT.
    pub total_with_vat: u64,
}

/// Reported monetary figures of a single line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemTotals {
    /// Line total after the item discount.
    pub line_total: u64,

    /// VAT on the line total.
    pub vat_amount: u64,

    /// Line total including VAT.
    pub total_with_vat: u64,
}

/// Calculate totals for `basket`.
///
/// `discount` is the basket discount resolved from the basket's live discount definition, or
/// `None` when there is no usable definition. Items carrying an item discount are not eligible
/// for it, and it never exceeds the eligible amount.
///
/// # Errors
///
/// Returns a [`PricingError`] if any figure overflows.
pub fn calculate_totals(
    basket: &Basket,
    discount: Option<&PercentageDiscount>,
) -> Result<Totals, PricingError> {
    let subtotal = sum_totals(basket.items().iter())?;

    let eligible_amount = sum_totals(basket.items().iter().filter(|item| !item.has_discount()))?;

    let discount = match discount {
        Some(discount) => discount
            .calculate_discount(eligible_amount)?
            .min(eligible_amount),
        None => 0,
    };

    let shipping = basket.shipping().map_or(0, |shipping| shipping.cost);

    let vat_base = subtotal.saturating_sub(discount);

    let total_without_vat = vat_base
        .checked_add(shipping)
        .ok_or(PricingError::Overflow)?;

    let vat_amount = percent_of_minor(&vat_rate(), vat_base)?;

    let total_with_vat = total_without_vat
        .checked_add(vat_amount)
        .ok_or(PricingError::Overflow)?;

    Ok(Totals {
        subtotal,
        discount,
        shipping,
        total_without_vat,
        vat_amount,
        total_with_vat,
    })
}

/// Calculate the line total and its VAT for a single item.
///
/// # Errors
///
/// Returns a [`PricingError`] if any figure overflows.
pub fn item_totals(item: &Item) -> Result<ItemTotals, PricingError> {
    let line_total = item.total()?;
    let vat_amount = percent_of_minor(&vat_rate(), line_total)?;

    let total_with_vat = line_total
        .checked_add(vat_amount)
        .ok_or(PricingError::Overflow)?;

    Ok(ItemTotals {
        line_total,
        vat_amount,
        total_with_vat,
    })
}

fn sum_totals<'a>(mut items: impl Iterator<Item = &'a Item>) -> Result<u64, PricingError> {
    items.try_fold(0_u64, |acc, item| {
        acc.checked_add(item.total()?)
            .ok_or(PricingError::Overflow)
    })
}
