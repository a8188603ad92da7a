//! Discount Definitions Repository

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{FromRow, Postgres, Row, postgres::PgRow, query, query_as, query_scalar};
use trolley::definitions::{DiscountDefinition, DiscountDefinitionUuid};
use uuid::Uuid;

use crate::{database::Db, repository::RepositoryError};

use super::DiscountDefinitionsRepository;

const GET_DEFINITION_BY_CODE_SQL: &str = include_str!("../sql/get_definition_by_code.sql");
const GET_DEFINITION_BY_UUID_SQL: &str = include_str!("../sql/get_definition_by_uuid.sql");
const UPSERT_DEFINITION_SQL: &str = include_str!("../sql/upsert_definition.sql");
const SET_DEFINITION_ACTIVE_SQL: &str = include_str!("../sql/set_definition_active.sql");

#[derive(Debug, Clone)]
pub struct PgDiscountDefinitionsRepository {
    db: Db,
}

impl PgDiscountDefinitionsRepository {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DiscountDefinitionsRepository for PgDiscountDefinitionsRepository {
    async fn get_by_code(&self, code: &str) -> Result<Option<DiscountDefinition>, RepositoryError> {
        let row = query_as::<Postgres, DefinitionRow>(GET_DEFINITION_BY_CODE_SQL)
            .bind(code)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.map(DefinitionRow::into_definition))
    }

    async fn get_by_uuid(
        &self,
        uuid: DiscountDefinitionUuid,
    ) -> Result<Option<DiscountDefinition>, RepositoryError> {
        let row = query_as::<Postgres, DefinitionRow>(GET_DEFINITION_BY_UUID_SQL)
            .bind(uuid.into_uuid())
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.map(DefinitionRow::into_definition))
    }

    async fn upsert(
        &self,
        code: &str,
        percentage: Decimal,
    ) -> Result<DiscountDefinitionUuid, RepositoryError> {
        let inserted = query_scalar::<Postgres, Uuid>(UPSERT_DEFINITION_SQL)
            .bind(DiscountDefinitionUuid::new().into_uuid())
            .bind(code)
            .bind(percentage)
            .fetch_optional(self.db.pool())
            .await?;

        if let Some(uuid) = inserted {
            return Ok(DiscountDefinitionUuid::from_uuid(uuid));
        }

        // The code already exists, possibly committed by a concurrent insert.
        self.get_by_code(code)
            .await?
            .map(|definition| definition.uuid)
            .ok_or(RepositoryError::NotFound)
    }

    async fn set_active(
        &self,
        uuid: DiscountDefinitionUuid,
        is_active: bool,
    ) -> Result<(), RepositoryError> {
        let rows_affected = query(SET_DEFINITION_ACTIVE_SQL)
            .bind(uuid.into_uuid())
            .bind(is_active)
            .execute(self.db.pool())
            .await?
            .rows_affected();

        if rows_affected == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

struct DefinitionRow(DiscountDefinition);

impl DefinitionRow {
    fn into_definition(self) -> DiscountDefinition {
        self.0
    }
}

impl<'r> FromRow<'r, PgRow> for DefinitionRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self(DiscountDefinition {
            uuid: DiscountDefinitionUuid::from_uuid(row.try_get("uuid")?),
            code: row.try_get("code")?,
            percentage: row.try_get("percentage")?,
            metadata: row.try_get("metadata")?,
            is_active: row.try_get("is_active")?,
        }))
    }
}
