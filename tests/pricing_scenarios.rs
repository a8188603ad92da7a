//! Integration tests for pricing whole baskets.
//!
//! Each scenario builds a basket through the public API, resolves the basket discount the way the
//! application does (from the live discount definition) and checks every reported figure.

use rust_decimal::Decimal;
use testresult::TestResult;

use trolley::prelude::*;

fn definition(code: &str, percentage: i64, is_active: bool) -> DiscountDefinition {
    DiscountDefinition {
        uuid: DiscountDefinitionUuid::new(),
        code: code.to_string(),
        percentage: Some(Decimal::from(percentage)),
        metadata: None,
        is_active,
    }
}

fn attach(basket: &mut Basket, definition: &DiscountDefinition) -> TestResult {
    let discount = definition
        .to_discount()?
        .ok_or("definition should be usable when attached")?;

    basket.apply_discount(discount.into(), Some(definition.uuid));

    Ok(())
}

fn price(basket: &Basket, definition: &DiscountDefinition) -> TestResult<Totals> {
    let discount = definition.to_discount()?;

    Ok(calculate_totals(basket, discount.as_ref())?)
}

#[test]
fn mixed_basket_with_item_and_basket_discounts() -> TestResult {
    let mut basket = Basket::new();

    basket.add_or_update_item(Item::new("Coffee", 500, 1, None)?)?;
    basket.add_or_update_item(Item::new(
        "Mug",
        200,
        1,
        Some(ItemDiscount::flat_amount(50)?),
    )?)?;
    basket.set_shipping(ShippingDetails::new(Country::UnitedKingdom, 20));

    let save10 = definition("SAVE10", 10, true);

    attach(&mut basket, &save10)?;

    assert_eq!(
        price(&basket, &save10)?,
        Totals {
            subtotal: 650,
            discount: 50,
            shipping: 20,
            total_without_vat: 620,
            vat_amount: 120,
            total_with_vat: 740,
        }
    );

    Ok(())
}

#[test]
fn full_discount_is_capped_at_eligible_amount() -> TestResult {
    let mut basket = Basket::new();

    basket.add_or_update_item(Item::new("Pen", 100, 1, None)?)?;
    basket.set_shipping(ShippingDetails::new(Country::Germany, 20));

    let everything = definition("EVERYTHING", 100, true);

    attach(&mut basket, &everything)?;

    let totals = price(&basket, &everything)?;

    assert_eq!(totals.discount, 100);
    assert_eq!(totals.total_without_vat, 20);
    assert_eq!(totals.vat_amount, 0);
    assert_eq!(totals.total_with_vat, 20);

    Ok(())
}

#[test]
fn large_amounts_do_not_overflow() -> TestResult {
    let mut basket = Basket::new();

    basket.add_or_update_item(Item::new("Island", 900_000_000, 2, None)?)?;

    let save10 = definition("SAVE10", 10, true);

    attach(&mut basket, &save10)?;

    assert_eq!(
        price(&basket, &save10)?,
        Totals {
            subtotal: 1_800_000_000,
            discount: 180_000_000,
            shipping: 0,
            total_without_vat: 1_620_000_000,
            vat_amount: 324_000_000,
            total_with_vat: 1_944_000_000,
        }
    );

    Ok(())
}

#[test]
fn deactivated_definition_stops_discounting_without_basket_changes() -> TestResult {
    let mut basket = Basket::new();

    basket.add_or_update_item(Item::new("Coffee", 500, 2, None)?)?;

    let mut save10 = definition("SAVE10", 10, true);

    attach(&mut basket, &save10)?;

    let before = basket.clone();

    assert_eq!(price(&basket, &save10)?.discount, 100);

    save10.is_active = false;

    let totals = price(&basket, &save10)?;

    assert_eq!(totals.discount, 0);
    assert_eq!(totals.total_without_vat, 1_000);
    assert_eq!(basket, before);

    Ok(())
}

#[test]
fn adding_discounted_items_never_changes_basket_discount() -> TestResult {
    let mut basket = Basket::new();

    basket.add_or_update_item(Item::new("Coffee", 500, 1, None)?)?;

    let save10 = definition("SAVE10", 10, true);

    attach(&mut basket, &save10)?;

    let before = price(&basket, &save10)?.discount;

    for quantity in 1..=5 {
        basket.add_or_update_item(Item::new(
            "Biscuits",
            150,
            quantity,
            Some(ItemDiscount::BuyOneGetOneFree),
        )?)?;

        assert_eq!(price(&basket, &save10)?.discount, before);
    }

    Ok(())
}

#[test]
fn total_without_vat_never_goes_below_shipping() -> TestResult {
    let everything = definition("EVERYTHING", 100, true);

    for unit_price in [1, 3, 99, 1_000, 12_345] {
        let mut basket = Basket::new();

        basket.add_or_update_item(Item::new("Thing", unit_price, 3, None)?)?;
        basket.add_or_update_item(Item::new(
            "Other",
            unit_price,
            1,
            Some(ItemDiscount::flat_amount(unit_price * 2)?),
        )?)?;
        basket.set_shipping(ShippingDetails::fallback());

        attach(&mut basket, &everything)?;

        let totals = price(&basket, &everything)?;

        assert_eq!(totals.total_without_vat, DEFAULT_SHIPPING_COST);
        assert_eq!(totals.total_with_vat, DEFAULT_SHIPPING_COST);
    }

    Ok(())
}

#[test]
fn reloaded_basket_prices_identically() -> TestResult {
    let mut basket = Basket::new();

    basket.add_or_update_item(Item::from_store(
        ProductId::new(1)?,
        "Coffee",
        500,
        3,
        None,
    )?)?;
    basket.add_or_update_item(Item::from_store(
        ProductId::new(2)?,
        "Mug",
        200,
        2,
        Some(ItemDiscount::flat_amount(50)?),
    )?)?;
    basket.add_or_update_item(Item::from_store(
        ProductId::new(3)?,
        "Biscuits",
        150,
        3,
        Some(ItemDiscount::BuyOneGetOneFree),
    )?)?;
    basket.set_shipping(ShippingDetails::new(Country::Australia, 25_00));

    let save10 = definition("SAVE10", 10, true);

    attach(&mut basket, &save10)?;

    let yaml = serde_norway::to_string(&basket)?;
    let reloaded: Basket = serde_norway::from_str(&yaml)?;

    assert_eq!(reloaded, basket);
    assert_eq!(price(&reloaded, &save10)?, price(&basket, &save10)?);

    Ok(())
}
