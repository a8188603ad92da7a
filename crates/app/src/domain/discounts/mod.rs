//! Discounts

mod errors;
pub mod repositories;
pub mod service;

pub use errors::DiscountCatalogError;
pub use service::*;
