//! Discount catalog errors.

use rust_decimal::Decimal;
use thiserror::Error;
use trolley::discounts::DiscountError;

use crate::repository::RepositoryError;

#[derive(Debug, Error)]
pub enum DiscountCatalogError {
    /// The code is already defined with another percentage.
    #[error("discount code {code} already exists with percentage {existing}")]
    Conflict {
        code: String,
        existing: Decimal,
        requested: Decimal,
    },

    #[error("discount code {code} is not active")]
    Inactive { code: String },

    #[error("discount definition not found")]
    NotFound,

    #[error(transparent)]
    InvalidDiscount(#[from] DiscountError),

    #[error("discount definition storage failed")]
    Repository(#[source] RepositoryError),
}

impl From<RepositoryError> for DiscountCatalogError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound => Self::NotFound,
            other => Self::Repository(other),
        }
    }
}
