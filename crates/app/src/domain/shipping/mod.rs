//! Shipping

mod errors;
pub mod rates;
pub mod repositories;
pub mod service;

pub use errors::ShippingError;
pub use service::*;
