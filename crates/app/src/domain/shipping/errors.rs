//! Shipping errors.

use thiserror::Error;

use crate::repository::RepositoryError;

#[derive(Debug, Error)]
pub enum ShippingError {
    #[error("shipping cost lookup failed")]
    Repository(#[from] RepositoryError),
}
