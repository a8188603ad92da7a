//! Baskets service errors.

use thiserror::Error;
use trolley::{
    discounts::DiscountError,
    items::{ItemError, ProductId},
    pricing::PricingError,
};

use crate::{
    domain::{discounts::DiscountCatalogError, shipping::ShippingError, totals::TotalsError},
    repository::RepositoryError,
};

#[derive(Debug, Error)]
pub enum BasketsServiceError {
    #[error("basket already exists")]
    AlreadyExists,

    #[error("basket not found")]
    NotFound,

    #[error("item {0} not found in basket")]
    ItemNotFound(ProductId),

    #[error("at least one item is required")]
    NoItems,

    #[error("invalid item: {0}")]
    InvalidItem(#[from] ItemError),

    #[error("invalid discount: {0}")]
    InvalidDiscount(#[from] DiscountError),

    /// The discount code cannot be attached.
    #[error(transparent)]
    Discount(DiscountCatalogError),

    /// The basket was saved by someone else since it was loaded.
    #[error("basket was modified concurrently")]
    StaleBasket,

    #[error(transparent)]
    Shipping(#[from] ShippingError),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error("basket storage failed")]
    Repository(#[source] RepositoryError),
}

impl From<RepositoryError> for BasketsServiceError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound => Self::NotFound,
            RepositoryError::AlreadyExists => Self::AlreadyExists,
            RepositoryError::Stale { .. } => Self::StaleBasket,
            other => Self::Repository(other),
        }
    }
}

impl From<DiscountCatalogError> for BasketsServiceError {
    fn from(error: DiscountCatalogError) -> Self {
        match error {
            DiscountCatalogError::InvalidDiscount(error) => Self::InvalidDiscount(error),
            other => Self::Discount(other),
        }
    }
}

impl From<TotalsError> for BasketsServiceError {
    fn from(error: TotalsError) -> Self {
        match error {
            TotalsError::Catalog(error) => error.into(),
            TotalsError::Pricing(error) => Self::Pricing(error),
        }
    }
}
