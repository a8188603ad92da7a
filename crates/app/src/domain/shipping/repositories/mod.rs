//! Shipping Cost Repositories

use async_trait::async_trait;
use mockall::automock;
use trolley::shipping::Country;

use crate::repository::RepositoryError;

mod memory;
mod postgres;

pub use memory::MemoryShippingCostsRepository;
pub use postgres::PgShippingCostsRepository;

#[automock]
#[async_trait]
pub trait ShippingCostsRepository: Send + Sync {
    /// Configured cost for `country`, if any.
    async fn get_cost(&self, country: Country) -> Result<Option<u64>, RepositoryError>;
}
