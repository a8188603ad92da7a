//! Baskets

pub mod data;
mod errors;
pub mod repositories;
pub mod service;

pub use errors::BasketsServiceError;
pub use service::*;
