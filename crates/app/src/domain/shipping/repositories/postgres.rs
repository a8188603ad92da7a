//! Shipping Costs Repository

use async_trait::async_trait;
use sqlx::{Postgres, query_scalar};
use trolley::shipping::Country;

use crate::{
    database::Db,
    repository::{RepositoryError, u64_from_db},
};

use super::ShippingCostsRepository;

const GET_SHIPPING_COST_SQL: &str = include_str!("../sql/get_shipping_cost.sql");

#[derive(Debug, Clone)]
pub struct PgShippingCostsRepository {
    db: Db,
}

impl PgShippingCostsRepository {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ShippingCostsRepository for PgShippingCostsRepository {
    async fn get_cost(&self, country: Country) -> Result<Option<u64>, RepositoryError> {
        let cost = query_scalar::<Postgres, i64>(GET_SHIPPING_COST_SQL)
            .bind(i16::from(country.code()))
            .fetch_optional(self.db.pool())
            .await?;

        Ok(cost
            .map(|cost| u64_from_db("cost", cost))
            .transpose()?)
    }
}
