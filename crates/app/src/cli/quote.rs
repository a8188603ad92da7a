use std::{
    fs,
    path::{Path, PathBuf},
};

use clap::Args;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;
use trolley_app::{
    context::AppContext,
    domain::{
        baskets::data::NewItem,
        shipping::rates::ShippingRates,
    },
};

use super::output;

#[derive(Debug, Args)]
pub(crate) struct QuoteArgs {
    /// YAML basket description
    basket: PathBuf,

    /// YAML shipping rate table; defaults to UK delivery at 4.99
    #[arg(long, env = "TROLLEY_RATES")]
    rates: Option<PathBuf>,

    /// Print the priced basket as JSON instead of a receipt
    #[arg(long)]
    json: bool,
}

/// Basket description read by `trolley quote`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct QuoteFile {
    #[serde(default)]
    items: Vec<NewItem>,

    #[serde(default)]
    discount: Option<QuoteDiscount>,

    /// Destination country, by alias, name or numeric code.
    #[serde(default)]
    shipping: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct QuoteDiscount {
    code: String,
    percentage: Decimal,
}

fn read(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|error| format!("failed to read {}: {error}", path.display()))
}

pub(crate) async fn run(args: QuoteArgs) -> Result<(), String> {
    let quote: QuoteFile = serde_norway::from_str(&read(&args.basket)?)
        .map_err(|error| format!("failed to parse {}: {error}", args.basket.display()))?;

    let rates = match &args.rates {
        Some(path) => ShippingRates::from_yaml(&read(path)?)
            .map_err(|error| format!("failed to parse {}: {error}", path.display()))?,
        None => ShippingRates::standard(),
    };

    let ctx = AppContext::in_memory(rates);

    let basket = ctx
        .baskets
        .create_basket()
        .await
        .map_err(|error| format!("failed to create basket: {error}"))?;

    let uuid = basket.uuid();

    if !quote.items.is_empty() {
        ctx.baskets
            .add_items(uuid, quote.items)
            .await
            .map_err(|error| format!("failed to add items: {error}"))?;
    }

    if let Some(discount) = quote.discount {
        ctx.baskets
            .apply_discount_code(uuid, &discount.code, discount.percentage)
            .await
            .map_err(|error| format!("failed to apply discount {}: {error}", discount.code))?;
    }

    if let Some(country) = quote.shipping {
        ctx.baskets
            .add_shipping(uuid, &country)
            .await
            .map_err(|error| format!("failed to add shipping: {error}"))?;
    }

    let snapshot = ctx
        .baskets
        .get_basket(uuid)
        .await
        .map_err(|error| format!("failed to price basket: {error}"))?;

    info!(
        basket_uuid = %uuid,
        total_with_vat = snapshot.totals.total_with_vat,
        "priced basket"
    );

    output::print_basket(&snapshot.basket, snapshot.totals, args.json)
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn quote_file_parses_items_discount_and_shipping() -> TestResult {
        let quote: QuoteFile = serde_norway::from_str(
            "items:\n\
             \x20 - name: Coffee\n    unit_price: 500\n    quantity: 1\n\
             \x20 - name: Mug\n    unit_price: 200\n    quantity: 1\n    discount:\n      type: flat_amount\n      amount_taken: 50\n\
             discount:\n  code: SAVE10\n  percentage: 12.5\n\
             shipping: GB\n",
        )?;

        assert_eq!(quote.items.len(), 2);
        assert_eq!(
            quote.discount.map(|discount| discount.percentage),
            Some(Decimal::new(125, 1))
        );
        assert_eq!(quote.shipping.as_deref(), Some("GB"));

        Ok(())
    }

    #[test]
    fn quote_file_rejects_unknown_fields() {
        let result = serde_norway::from_str::<QuoteFile>("coupon: SAVE10\n");

        assert!(result.is_err(), "unknown keys should be rejected");
    }
}
