//! Basket Repositories

use async_trait::async_trait;
use mockall::automock;
use trolley::basket::{Basket, BasketUuid};

use crate::repository::RepositoryError;

mod memory;
mod postgres;

pub use memory::MemoryBasketsRepository;
pub use postgres::PgBasketsRepository;

/// Whole-basket storage with optimistic concurrency.
///
/// Saves replace the stored basket. A save is rejected with [`RepositoryError::Stale`] unless
/// the basket's version matches the stored one.
#[automock]
#[async_trait]
pub trait BasketsRepository: Send + Sync {
    /// Load a basket.
    async fn get_basket(&self, uuid: BasketUuid) -> Result<Basket, RepositoryError>;

    /// Load every basket, oldest first.
    async fn list_baskets(&self) -> Result<Vec<Basket>, RepositoryError>;

    /// Store a new basket.
    async fn create_basket(&self, basket: &Basket) -> Result<(), RepositoryError>;

    /// Replace a stored basket.
    ///
    /// Returns the stored state: pending items have product ids and the version has moved on.
    async fn save_basket(&self, basket: &Basket) -> Result<Basket, RepositoryError>;
}
