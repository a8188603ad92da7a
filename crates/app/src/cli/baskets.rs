use clap::{Args, Subcommand};
use rust_decimal::Decimal;
use trolley::{
    basket::BasketUuid,
    discounts::{DiscountError, ItemDiscount},
    items::{ItemSummary, ProductId},
};
use trolley_app::{context::AppContext, domain::baskets::data::NewItem};
use uuid::Uuid;

use super::{DatabaseArgs, output};

#[derive(Debug, Args)]
pub(crate) struct BasketsCommand {
    #[command(subcommand)]
    command: BasketsSubcommand,

    #[command(flatten)]
    database: DatabaseArgs,

    /// Print baskets as JSON instead of a receipt
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Debug, Subcommand)]
enum BasketsSubcommand {
    /// Create an empty basket.
    Create,

    /// Print every stored basket.
    List,

    /// Print a basket with its totals.
    Show { basket: Uuid },

    /// Add an item, merging it into a matching line.
    AddItem(AddItemArgs),

    RemoveItem { basket: Uuid, product_id: u64 },

    /// Print a single line.
    Item { basket: Uuid, product_id: u64 },

    /// Print the price of a single line with its VAT.
    ItemPrice { basket: Uuid, product_id: u64 },

    /// Attach or replace the discount of a line.
    ItemDiscount(ItemDiscountArgs),

    /// Attach a percentage discount code.
    ApplyDiscount {
        basket: Uuid,
        code: String,
        percentage: Decimal,
    },

    /// Select shipping by country alias, name or numeric code.
    Shipping { basket: Uuid, country: String },
}

#[derive(Debug, Args)]
struct AddItemArgs {
    basket: Uuid,

    /// Product name
    #[arg(long)]
    name: String,

    /// Unit price in minor units
    #[arg(long)]
    unit_price: u64,

    #[arg(long, default_value_t = 1)]
    quantity: u32,
}

#[derive(Debug, Args)]
struct ItemDiscountArgs {
    basket: Uuid,

    product_id: u64,

    /// Amount taken off each unit, in minor units
    #[arg(
        long,
        conflicts_with = "buy_one_get_one_free",
        required_unless_present = "buy_one_get_one_free"
    )]
    flat_amount: Option<u64>,

    /// Make every second unit free
    #[arg(long)]
    buy_one_get_one_free: bool,
}

impl ItemDiscountArgs {
    fn discount(&self) -> Result<ItemDiscount, DiscountError> {
        match self.flat_amount {
            Some(amount) => ItemDiscount::flat_amount(amount),
            None => Ok(ItemDiscount::BuyOneGetOneFree),
        }
    }
}

fn product_id(id: u64) -> Result<ProductId, String> {
    ProductId::new(id).map_err(|error| error.to_string())
}

fn print_item(item: &ItemSummary) {
    if let Some(product_id) = item.product_id {
        println!("product_id: {product_id}");
    }

    println!("name: {}", item.name);
    println!("unit_price: {}", item.unit_price);
    println!("quantity: {}", item.quantity);
    println!("line_total: {}", item.line_total);
    println!(
        "discount: {}",
        item.discount_description.as_deref().unwrap_or("none")
    );
}

pub(crate) async fn run(command: BasketsCommand) -> Result<(), String> {
    let ctx = AppContext::from_database_url(&command.database.database_url)
        .await
        .map_err(|error| format!("failed to initialise: {error}"))?;

    let baskets = ctx.baskets.as_ref();
    let json = command.json;

    match command.command {
        BasketsSubcommand::Create => {
            let basket = baskets
                .create_basket()
                .await
                .map_err(|error| format!("failed to create basket: {error}"))?;

            println!("basket_uuid: {}", basket.uuid());

            Ok(())
        }
        BasketsSubcommand::List => {
            let snapshots = baskets
                .list_baskets()
                .await
                .map_err(|error| format!("failed to list baskets: {error}"))?;

            for snapshot in snapshots {
                output::print_basket(&snapshot.basket, snapshot.totals, json)?;
            }

            Ok(())
        }
        BasketsSubcommand::Show { basket } => {
            let snapshot = baskets
                .get_basket(BasketUuid::from_uuid(basket))
                .await
                .map_err(|error| format!("failed to load basket: {error}"))?;

            output::print_basket(&snapshot.basket, snapshot.totals, json)
        }
        BasketsSubcommand::AddItem(args) => {
            let item = NewItem {
                name: args.name,
                unit_price: args.unit_price,
                quantity: args.quantity,
                discount: None,
            };

            let snapshot = baskets
                .add_items(BasketUuid::from_uuid(args.basket), vec![item])
                .await
                .map_err(|error| format!("failed to add item: {error}"))?;

            output::print_basket(&snapshot.basket, snapshot.totals, json)
        }
        BasketsSubcommand::RemoveItem { basket, product_id } => {
            let product_id = self::product_id(product_id)?;

            let snapshot = baskets
                .remove_item(BasketUuid::from_uuid(basket), product_id)
                .await
                .map_err(|error| format!("failed to remove item {product_id}: {error}"))?;

            output::print_basket(&snapshot.basket, snapshot.totals, json)
        }
        BasketsSubcommand::Item { basket, product_id } => {
            let product_id = self::product_id(product_id)?;

            let item = baskets
                .get_item(BasketUuid::from_uuid(basket), product_id)
                .await
                .map_err(|error| format!("failed to load item {product_id}: {error}"))?;

            print_item(&item);

            Ok(())
        }
        BasketsSubcommand::ItemPrice { basket, product_id } => {
            let product_id = self::product_id(product_id)?;

            let totals = baskets
                .get_item_totals(BasketUuid::from_uuid(basket), product_id)
                .await
                .map_err(|error| format!("failed to price item {product_id}: {error}"))?;

            println!("line_total: {}", totals.line_total);
            println!("vat_amount: {}", totals.vat_amount);
            println!("total_with_vat: {}", totals.total_with_vat);

            Ok(())
        }
        BasketsSubcommand::ItemDiscount(args) => {
            let product_id = self::product_id(args.product_id)?;
            let discount = args.discount().map_err(|error| error.to_string())?;

            let item = baskets
                .apply_item_discount(BasketUuid::from_uuid(args.basket), product_id, discount)
                .await
                .map_err(|error| format!("failed to discount item {product_id}: {error}"))?;

            print_item(&item);

            Ok(())
        }
        BasketsSubcommand::ApplyDiscount {
            basket,
            code,
            percentage,
        } => {
            let snapshot = baskets
                .apply_discount_code(BasketUuid::from_uuid(basket), &code, percentage)
                .await
                .map_err(|error| format!("failed to apply discount {code}: {error}"))?;

            output::print_basket(&snapshot.basket, snapshot.totals, json)
        }
        BasketsSubcommand::Shipping { basket, country } => {
            let totals = baskets
                .add_shipping(BasketUuid::from_uuid(basket), &country)
                .await
                .map_err(|error| format!("failed to add shipping: {error}"))?;

            output::print_totals(&totals);

            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use testresult::TestResult;

    use crate::cli::{Cli, Commands};

    use super::*;

    fn parse(args: &[&str]) -> Result<BasketsSubcommand, clap::Error> {
        let cli = Cli::try_parse_from(
            ["trolley", "baskets", "--database-url", "postgres://localhost/trolley"]
                .iter()
                .chain(args),
        )?;

        match cli.command {
            Commands::Baskets(command) => Ok(command.command),
            other => Err(clap::Error::raw(
                clap::error::ErrorKind::InvalidSubcommand,
                format!("unexpected command {other:?}"),
            )),
        }
    }

    const BASKET: &str = "0190f3c5-7b2a-7c1e-9a4b-3f6d2e8c1a55";

    #[test]
    fn item_discount_parses_flat_amount() -> TestResult {
        let BasketsSubcommand::ItemDiscount(args) =
            parse(&["item-discount", BASKET, "3", "--flat-amount", "50"])?
        else {
            return Err("expected item-discount".into());
        };

        assert_eq!(args.product_id, 3);
        assert_eq!(args.discount()?, ItemDiscount::flat_amount(50)?);

        Ok(())
    }

    #[test]
    fn item_discount_parses_buy_one_get_one_free() -> TestResult {
        let BasketsSubcommand::ItemDiscount(args) =
            parse(&["item-discount", BASKET, "3", "--buy-one-get-one-free"])?
        else {
            return Err("expected item-discount".into());
        };

        assert_eq!(args.discount()?, ItemDiscount::BuyOneGetOneFree);

        Ok(())
    }

    #[test]
    fn item_discount_requires_exactly_one_kind() {
        assert!(parse(&["item-discount", BASKET, "3"]).is_err());
        assert!(
            parse(&[
                "item-discount",
                BASKET,
                "3",
                "--flat-amount",
                "50",
                "--buy-one-get-one-free",
            ])
            .is_err()
        );
    }

    #[test]
    fn item_and_item_price_take_basket_and_product() -> TestResult {
        assert!(matches!(
            parse(&["item", BASKET, "7"])?,
            BasketsSubcommand::Item { product_id: 7, .. }
        ));
        assert!(matches!(
            parse(&["item-price", BASKET, "7"])?,
            BasketsSubcommand::ItemPrice { product_id: 7, .. }
        ));

        Ok(())
    }
}
