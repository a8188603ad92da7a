//! Trolley prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    basket::{Basket, BasketParts, BasketUuid},
    definitions::{DiscountDefinition, DiscountDefinitionUuid},
    discounts::{
        BasketDiscount, DiscountError, ItemDiscount, ItemDiscountType, PercentageDiscount,
    },
    items::{Item, ItemError, ItemSummary, ProductId},
    pricing::{ItemTotals, PricingError, Totals, calculate_totals, item_totals, vat_rate},
    receipt::{Receipt, ReceiptError},
    shipping::{Country, DEFAULT_SHIPPING_COST, ShippingDetails},
    uuids::TypedUuid,
};
