//! Receipt

use std::io;

use rusty_money::{
    Money,
    iso::{self, Currency},
};
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};
use thiserror::Error;

use crate::{
    basket::{Basket, BasketUuid},
    discounts::BasketDiscount,
    items::{Item, ItemSummary},
    pricing::{PricingError, Totals},
    shipping::ShippingDetails,
};

/// Errors that can occur when building or writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Error calculating a line total.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Amount too large to format as money.
    #[error("amount {0} is too large to display")]
    AmountOutOfRange(u64),

    /// IO error
    #[error("IO error")]
    IO,
}

/// Printable snapshot of a priced basket.
#[derive(Debug, Clone)]
pub struct Receipt {
    basket: BasketUuid,
    items: Vec<ItemSummary>,
    shipping: Option<ShippingDetails>,
    discount_code: Option<String>,
    totals: Totals,
    currency: &'static Currency,
}

impl Receipt {
    /// Build a receipt from a basket and the totals calculated for it.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if a line total cannot be calculated.
    pub fn new(basket: &Basket, totals: Totals) -> Result<Self, ReceiptError> {
        let items = basket
            .items()
            .iter()
            .map(Item::summary)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            basket: basket.uuid(),
            items,
            shipping: basket.shipping().copied(),
            // A code that no longer takes anything off is not named.
            discount_code: basket
                .discount()
                .filter(|_| totals.discount > 0)
                .map(BasketDiscount::code)
                .map(str::to_string),
            totals,
            currency: iso::GBP,
        })
    }

    /// Line summaries in basket order.
    pub fn items(&self) -> &[ItemSummary] {
        &self.items
    }

    /// Totals printed in the summary.
    pub fn totals(&self) -> &Totals {
        &self.totals
    }

    /// Writes the receipt as an item table followed by the totals summary.
    ///
    /// # Errors
    ///
    /// Returns an error if an amount cannot be formatted or the output cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        writeln!(out, "Basket {}", self.basket).map_err(|_err| ReceiptError::IO)?;

        let mut builder = Builder::default();

        builder.push_record(["", "Item", "Qty", "Unit Price", "Line Total", "Discount"]);

        for (idx, item) in self.items.iter().enumerate() {
            let product = item
                .product_id
                .map_or_else(|| format!("#{:<3}", idx + 1), |id| format!("{id:<4}"));

            builder.push_record([
                product,
                item.name.clone(),
                item.quantity.to_string(),
                self.format_minor(item.unit_price)?,
                self.format_minor(item.line_total)?,
                item.discount_description.clone().unwrap_or_default(),
            ]);
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Columns::new(2..5), Alignment::right());

        writeln!(out, "\n{table}").map_err(|_err| ReceiptError::IO)?;

        self.write_summary(&mut out)
    }

    fn write_summary(&self, out: &mut impl io::Write) -> Result<(), ReceiptError> {
        let shipping_label = match self.shipping.and_then(|shipping| shipping.country) {
            Some(country) => format!(" Shipping ({country}):"),
            None if self.shipping.is_some() => " Shipping (default):".to_string(),
            None => " Shipping:".to_string(),
        };

        let discount_label = match &self.discount_code {
            Some(code) => format!(" Discount ({code}):"),
            None => " Discount:".to_string(),
        };

        let lines = [
            (" Subtotal:".to_string(), self.totals.subtotal),
            (discount_label, self.totals.discount),
            (shipping_label, self.totals.shipping),
            (" Total ex. VAT:".to_string(), self.totals.total_without_vat),
            (" VAT:".to_string(), self.totals.vat_amount),
            (" Total:".to_string(), self.totals.total_with_vat),
        ];

        let label_width = lines
            .iter()
            .map(|(label, _)| label.chars().count())
            .max()
            .unwrap_or_default();

        for (label, amount) in &lines {
            let value = self.format_minor(*amount)?;

            writeln!(out, "{label:>label_width$}  {value:>12}").map_err(|_err| ReceiptError::IO)?;
        }

        writeln!(out).map_err(|_err| ReceiptError::IO)
    }

    fn format_minor(&self, amount: u64) -> Result<String, ReceiptError> {
        let minor = i64::try_from(amount).map_err(|_err| ReceiptError::AmountOutOfRange(amount))?;

        Ok(Money::from_minor(minor, self.currency).to_string())
    }
}
