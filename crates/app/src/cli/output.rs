use std::io;

use serde::Serialize;
use trolley::{
    basket::Basket,
    items::ItemSummary,
    pricing::Totals,
    receipt::Receipt,
};

#[derive(Debug, Serialize)]
struct PricedBasket<'a> {
    basket: &'a Basket,
    items: &'a [ItemSummary],
    totals: &'a Totals,
}

/// Print a priced basket as a receipt, or as JSON when `json` is set.
pub(crate) fn print_basket(basket: &Basket, totals: Totals, json: bool) -> Result<(), String> {
    let receipt =
        Receipt::new(basket, totals).map_err(|error| format!("failed to build receipt: {error}"))?;

    if json {
        let priced = PricedBasket {
            basket,
            items: receipt.items(),
            totals: receipt.totals(),
        };

        let rendered = serde_json::to_string_pretty(&priced)
            .map_err(|error| format!("failed to encode basket: {error}"))?;

        println!("{rendered}");

        return Ok(());
    }

    receipt
        .write_to(io::stdout().lock())
        .map_err(|error| format!("failed to write receipt: {error}"))
}

pub(crate) fn print_totals(totals: &Totals) {
    println!("subtotal: {}", totals.subtotal);
    println!("discount: {}", totals.discount);
    println!("shipping: {}", totals.shipping);
    println!("total_without_vat: {}", totals.total_without_vat);
    println!("vat_amount: {}", totals.vat_amount);
    println!("total_with_vat: {}", totals.total_with_vat);
}
