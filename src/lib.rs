//! Trolley
//!
//! Trolley is a basket pricing engine: baskets of items with per-line discounts, a code based
//! basket discount, destination shipping and flat-rate VAT, all priced in integer minor units.

pub mod basket;
pub mod definitions;
pub mod discounts;
pub mod items;
pub mod prelude;
pub mod pricing;
pub mod receipt;
pub mod shipping;
pub mod uuids;
