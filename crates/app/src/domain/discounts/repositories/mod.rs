//! Discount Definition Repositories

use async_trait::async_trait;
use mockall::automock;
use rust_decimal::Decimal;
use trolley::definitions::{DiscountDefinition, DiscountDefinitionUuid};

use crate::repository::RepositoryError;

mod memory;
mod postgres;

pub use memory::MemoryDiscountDefinitionsRepository;
pub use postgres::PgDiscountDefinitionsRepository;

#[automock]
#[async_trait]
pub trait DiscountDefinitionsRepository: Send + Sync {
    /// Find the definition registered under `code`.
    async fn get_by_code(&self, code: &str) -> Result<Option<DiscountDefinition>, RepositoryError>;

    /// Find a definition by identity.
    async fn get_by_uuid(
        &self,
        uuid: DiscountDefinitionUuid,
    ) -> Result<Option<DiscountDefinition>, RepositoryError>;

    /// Create an active definition for `code` unless one exists.
    ///
    /// Returns the identity of the definition stored under `code`. An existing definition is
    /// left untouched, whatever its percentage.
    async fn upsert(
        &self,
        code: &str,
        percentage: Decimal,
    ) -> Result<DiscountDefinitionUuid, RepositoryError>;

    /// Activate or deactivate a definition.
    async fn set_active(
        &self,
        uuid: DiscountDefinitionUuid,
        is_active: bool,
    ) -> Result<(), RepositoryError>;
}
