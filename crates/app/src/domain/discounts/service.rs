//! Discount Catalog

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use rust_decimal::Decimal;
use tracing::{Span, debug, info};
use trolley::{
    definitions::{DiscountDefinition, DiscountDefinitionUuid},
    discounts::PercentageDiscount,
};

use crate::domain::discounts::{
    DiscountCatalogError, repositories::DiscountDefinitionsRepository,
};

#[derive(Clone)]
pub struct RepositoryDiscountCatalog {
    repository: Arc<dyn DiscountDefinitionsRepository>,
}

impl RepositoryDiscountCatalog {
    #[must_use]
    pub fn new(repository: Arc<dyn DiscountDefinitionsRepository>) -> Self {
        Self { repository }
    }
}

impl std::fmt::Debug for RepositoryDiscountCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryDiscountCatalog")
            .finish_non_exhaustive()
    }
}

/// Percentage of a definition that may be attached to a basket.
fn usable_percentage(definition: &DiscountDefinition) -> Result<Decimal, DiscountCatalogError> {
    definition
        .percentage
        .filter(|_| definition.is_usable())
        .ok_or_else(|| DiscountCatalogError::Inactive {
            code: definition.code.clone(),
        })
}

#[async_trait]
impl DiscountCatalog for RepositoryDiscountCatalog {
    #[tracing::instrument(
        name = "discounts.catalog.ensure_definition",
        skip(self),
        fields(definition_uuid = tracing::field::Empty),
        err
    )]
    async fn ensure_definition(
        &self,
        code: &str,
        percentage: Decimal,
    ) -> Result<DiscountDefinition, DiscountCatalogError> {
        PercentageDiscount::new(code, percentage)?;

        if let Some(existing) = self.repository.get_by_code(code).await? {
            let stored = usable_percentage(&existing)?;

            if stored != percentage {
                return Err(DiscountCatalogError::Conflict {
                    code: code.to_string(),
                    existing: stored,
                    requested: percentage,
                });
            }

            Span::current().record("definition_uuid", tracing::field::display(existing.uuid));

            return Ok(existing);
        }

        let uuid = self.repository.upsert(code, percentage).await?;

        let definition = self
            .repository
            .get_by_uuid(uuid)
            .await?
            .ok_or(DiscountCatalogError::NotFound)?;

        let stored = usable_percentage(&definition)?;

        // Another caller may have registered the code between lookup and insert.
        if stored != percentage {
            return Err(DiscountCatalogError::Conflict {
                code: code.to_string(),
                existing: stored,
                requested: percentage,
            });
        }

        Span::current().record("definition_uuid", tracing::field::display(uuid));

        info!(definition_uuid = %uuid, "created discount definition");

        Ok(definition)
    }

    #[tracing::instrument(name = "discounts.catalog.get_active_definition", skip(self), err)]
    async fn get_active_definition(
        &self,
        uuid: Option<DiscountDefinitionUuid>,
    ) -> Result<Option<DiscountDefinition>, DiscountCatalogError> {
        let Some(uuid) = uuid else {
            return Ok(None);
        };

        let definition = self.repository.get_by_uuid(uuid).await?;

        match definition {
            Some(definition) if definition.is_usable() => Ok(Some(definition)),
            Some(_) => {
                debug!(definition_uuid = %uuid, "discount definition is no longer usable");

                Ok(None)
            }
            None => {
                debug!(definition_uuid = %uuid, "discount definition is missing");

                Ok(None)
            }
        }
    }

    #[tracing::instrument(name = "discounts.catalog.deactivate", skip(self), err)]
    async fn deactivate(&self, code: &str) -> Result<DiscountDefinition, DiscountCatalogError> {
        let mut definition = self
            .repository
            .get_by_code(code)
            .await?
            .ok_or(DiscountCatalogError::NotFound)?;

        self.repository.set_active(definition.uuid, false).await?;

        definition.is_active = false;

        info!(definition_uuid = %definition.uuid, "deactivated discount definition");

        Ok(definition)
    }
}

#[automock]
#[async_trait]
pub trait DiscountCatalog: Send + Sync {
    /// Resolve the definition for a code being attached to a basket, creating it when missing.
    ///
    /// An existing definition must be active and carry the same percentage.
    async fn ensure_definition(
        &self,
        code: &str,
        percentage: Decimal,
    ) -> Result<DiscountDefinition, DiscountCatalogError>;

    /// Look up a definition for pricing. Missing and unusable definitions resolve to `None`.
    async fn get_active_definition(
        &self,
        uuid: Option<DiscountDefinitionUuid>,
    ) -> Result<Option<DiscountDefinition>, DiscountCatalogError>;

    /// Stop honouring a code. Baskets referencing it lose the discount on their next pricing.
    async fn deactivate(&self, code: &str) -> Result<DiscountDefinition, DiscountCatalogError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;
    use trolley::discounts::DiscountError;

    use crate::{
        domain::discounts::repositories::{
            MemoryDiscountDefinitionsRepository, MockDiscountDefinitionsRepository,
        },
        repository::RepositoryError,
    };

    use super::*;

    fn definition(code: &str, percentage: i64, is_active: bool) -> DiscountDefinition {
        DiscountDefinition {
            uuid: DiscountDefinitionUuid::new(),
            code: code.to_string(),
            percentage: Some(Decimal::from(percentage)),
            metadata: None,
            is_active,
        }
    }

    fn memory_catalog() -> (Arc<MemoryDiscountDefinitionsRepository>, RepositoryDiscountCatalog) {
        let repository = Arc::new(MemoryDiscountDefinitionsRepository::new());
        let catalog = RepositoryDiscountCatalog::new(repository.clone());

        (repository, catalog)
    }

    #[tokio::test]
    async fn ensure_definition_creates_missing_code() -> TestResult {
        let (_, catalog) = memory_catalog();

        let created = catalog
            .ensure_definition("SAVE10", Decimal::from(10))
            .await?;

        assert_eq!(created.code, "SAVE10");
        assert!(created.is_usable());

        Ok(())
    }

    #[tokio::test]
    async fn ensure_definition_returns_existing_definition() -> TestResult {
        let (_, catalog) = memory_catalog();

        let first = catalog
            .ensure_definition("SAVE10", Decimal::from(10))
            .await?;

        let second = catalog
            .ensure_definition("SAVE10", Decimal::new(1000, 2))
            .await?;

        assert_eq!(first.uuid, second.uuid);

        Ok(())
    }

    #[tokio::test]
    async fn ensure_definition_rejects_percentage_conflict() -> TestResult {
        let (_, catalog) = memory_catalog();

        catalog
            .ensure_definition("SAVE10", Decimal::from(10))
            .await?;

        let result = catalog
            .ensure_definition("SAVE10", Decimal::from(20))
            .await;

        assert!(
            matches!(
                result,
                Err(DiscountCatalogError::Conflict { ref code, existing, requested })
                    if code == "SAVE10"
                        && existing == Decimal::from(10)
                        && requested == Decimal::from(20)
            ),
            "expected Conflict, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn ensure_definition_rejects_inactive_code() -> TestResult {
        let (repository, catalog) = memory_catalog();

        repository.insert(definition("OLD", 10, false)).await;

        let result = catalog.ensure_definition("OLD", Decimal::from(10)).await;

        assert!(
            matches!(result, Err(DiscountCatalogError::Inactive { ref code }) if code == "OLD"),
            "expected Inactive, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn ensure_definition_validates_percentage_before_lookup() {
        let mut repository = MockDiscountDefinitionsRepository::new();

        repository.expect_get_by_code().never();
        repository.expect_upsert().never();

        let catalog = RepositoryDiscountCatalog::new(Arc::new(repository));

        let result = catalog.ensure_definition("FREE", Decimal::from(150)).await;

        assert!(
            matches!(
                result,
                Err(DiscountCatalogError::InvalidDiscount(
                    DiscountError::PercentageOutOfRange(_)
                ))
            ),
            "expected InvalidDiscount, got {result:?}"
        );
    }

    #[tokio::test]
    async fn ensure_definition_fails_when_upserted_definition_cannot_be_read_back() {
        let mut repository = MockDiscountDefinitionsRepository::new();

        repository.expect_get_by_code().returning(|_| Ok(None));

        repository
            .expect_upsert()
            .withf(|code, percentage| code == "SAVE10" && *percentage == Decimal::from(10))
            .times(1)
            .returning(|_, _| Ok(DiscountDefinitionUuid::new()));

        repository.expect_get_by_uuid().returning(|_| Ok(None));

        let catalog = RepositoryDiscountCatalog::new(Arc::new(repository));

        let result = catalog
            .ensure_definition("SAVE10", Decimal::from(10))
            .await;

        assert!(
            matches!(result, Err(DiscountCatalogError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn ensure_definition_rejects_code_registered_concurrently_with_other_percentage() {
        let existing = definition("SAVE10", 10, true);
        let existing_uuid = existing.uuid;

        let mut repository = MockDiscountDefinitionsRepository::new();

        repository.expect_get_by_code().returning(|_| Ok(None));

        repository
            .expect_upsert()
            .times(1)
            .returning(move |_, _| Ok(existing_uuid));

        repository
            .expect_get_by_uuid()
            .returning(move |_| Ok(Some(existing.clone())));

        let catalog = RepositoryDiscountCatalog::new(Arc::new(repository));

        let result = catalog
            .ensure_definition("SAVE10", Decimal::from(20))
            .await;

        assert!(
            matches!(
                result,
                Err(DiscountCatalogError::Conflict { existing, requested, .. })
                    if existing == Decimal::from(10) && requested == Decimal::from(20)
            ),
            "expected Conflict, got {result:?}"
        );
    }

    #[tokio::test]
    async fn ensure_definition_surfaces_storage_errors() {
        let mut repository = MockDiscountDefinitionsRepository::new();

        repository
            .expect_get_by_code()
            .returning(|_| Err(RepositoryError::Sql(sqlx::Error::PoolTimedOut)));

        let catalog = RepositoryDiscountCatalog::new(Arc::new(repository));

        let result = catalog
            .ensure_definition("SAVE10", Decimal::from(10))
            .await;

        assert!(
            matches!(result, Err(DiscountCatalogError::Repository(_))),
            "expected Repository, got {result:?}"
        );
    }

    #[tokio::test]
    async fn get_active_definition_without_uuid_is_none() -> TestResult {
        let (_, catalog) = memory_catalog();

        assert!(catalog.get_active_definition(None).await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn get_active_definition_filters_unusable_definitions() -> TestResult {
        let (repository, catalog) = memory_catalog();

        let active = definition("ACTIVE", 10, true);
        let inactive = definition("INACTIVE", 10, false);

        let mut zero = definition("ZERO", 0, true);
        zero.percentage = Some(Decimal::ZERO);

        let mut missing_percentage = definition("NONE", 10, true);
        missing_percentage.percentage = None;

        for definition in [&active, &inactive, &zero, &missing_percentage] {
            repository.insert(definition.clone()).await;
        }

        assert_eq!(
            catalog.get_active_definition(Some(active.uuid)).await?,
            Some(active)
        );

        for uuid in [
            inactive.uuid,
            zero.uuid,
            missing_percentage.uuid,
            DiscountDefinitionUuid::new(),
        ] {
            assert!(catalog.get_active_definition(Some(uuid)).await?.is_none());
        }

        Ok(())
    }

    #[tokio::test]
    async fn deactivate_marks_definition_inactive() -> TestResult {
        let (repository, catalog) = memory_catalog();

        let created = catalog
            .ensure_definition("SAVE10", Decimal::from(10))
            .await?;

        let deactivated = catalog.deactivate("SAVE10").await?;

        assert!(!deactivated.is_active);

        let stored = repository
            .get_by_uuid(created.uuid)
            .await?
            .ok_or("definition should exist")?;

        assert!(!stored.is_active);
        assert!(catalog.get_active_definition(Some(created.uuid)).await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn deactivate_unknown_code_returns_not_found() {
        let (_, catalog) = memory_catalog();

        let result = catalog.deactivate("MISSING").await;

        assert!(
            matches!(result, Err(DiscountCatalogError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }
}
