//! In-memory Discount Definitions Repository

use async_trait::async_trait;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use tokio::sync::RwLock;
use trolley::definitions::{DiscountDefinition, DiscountDefinitionUuid};

use crate::repository::RepositoryError;

use super::DiscountDefinitionsRepository;

#[derive(Debug, Default)]
pub struct MemoryDiscountDefinitionsRepository {
    definitions: RwLock<FxHashMap<DiscountDefinitionUuid, DiscountDefinition>>,
}

impl MemoryDiscountDefinitionsRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a definition as is, replacing any definition with the same identity.
    pub async fn insert(&self, definition: DiscountDefinition) {
        self.definitions
            .write()
            .await
            .insert(definition.uuid, definition);
    }
}

#[async_trait]
impl DiscountDefinitionsRepository for MemoryDiscountDefinitionsRepository {
    async fn get_by_code(&self, code: &str) -> Result<Option<DiscountDefinition>, RepositoryError> {
        let definitions = self.definitions.read().await;

        Ok(definitions
            .values()
            .find(|definition| definition.code == code)
            .cloned())
    }

    async fn get_by_uuid(
        &self,
        uuid: DiscountDefinitionUuid,
    ) -> Result<Option<DiscountDefinition>, RepositoryError> {
        Ok(self.definitions.read().await.get(&uuid).cloned())
    }

    async fn upsert(
        &self,
        code: &str,
        percentage: Decimal,
    ) -> Result<DiscountDefinitionUuid, RepositoryError> {
        let mut definitions = self.definitions.write().await;

        if let Some(existing) = definitions
            .values()
            .find(|definition| definition.code == code)
        {
            return Ok(existing.uuid);
        }

        let uuid = DiscountDefinitionUuid::new();

        definitions.insert(
            uuid,
            DiscountDefinition {
                uuid,
                code: code.to_string(),
                percentage: Some(percentage),
                metadata: None,
                is_active: true,
            },
        );

        Ok(uuid)
    }

    async fn set_active(
        &self,
        uuid: DiscountDefinitionUuid,
        is_active: bool,
    ) -> Result<(), RepositoryError> {
        let mut definitions = self.definitions.write().await;

        let definition = definitions
            .get_mut(&uuid)
            .ok_or(RepositoryError::NotFound)?;

        definition.is_active = is_active;

        Ok(())
    }
}
