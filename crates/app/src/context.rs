//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    database::{self, Db},
    domain::{
        baskets::{
            BasketsService, DefaultBasketsService,
            repositories::{BasketsRepository, MemoryBasketsRepository, PgBasketsRepository},
        },
        discounts::{
            DiscountCatalog, RepositoryDiscountCatalog,
            repositories::{
                DiscountDefinitionsRepository, MemoryDiscountDefinitionsRepository,
                PgDiscountDefinitionsRepository,
            },
        },
        shipping::{
            RatesShippingPolicy,
            rates::ShippingRates,
            repositories::{
                MemoryShippingCostsRepository, PgShippingCostsRepository,
                ShippingCostsRepository,
            },
        },
        totals::CatalogTotalsCalculator,
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),
}

#[derive(Clone)]
pub struct AppContext {
    pub baskets: Arc<dyn BasketsService>,
    pub discounts: Arc<dyn DiscountCatalog>,
}

impl AppContext {
    /// Wire the services over the given repositories.
    #[must_use]
    pub fn new(
        baskets: Arc<dyn BasketsRepository>,
        definitions: Arc<dyn DiscountDefinitionsRepository>,
        shipping_costs: Arc<dyn ShippingCostsRepository>,
    ) -> Self {
        let discounts: Arc<dyn DiscountCatalog> =
            Arc::new(RepositoryDiscountCatalog::new(definitions));

        let baskets = DefaultBasketsService::new(
            baskets,
            discounts.clone(),
            Arc::new(RatesShippingPolicy::new(shipping_costs)),
            Arc::new(CatalogTotalsCalculator::new(discounts.clone())),
        );

        Self {
            baskets: Arc::new(baskets),
            discounts,
        }
    }

    /// Build application context backed by process memory.
    #[must_use]
    pub fn in_memory(rates: ShippingRates) -> Self {
        Self::new(
            Arc::new(MemoryBasketsRepository::new()),
            Arc::new(MemoryDiscountDefinitionsRepository::new()),
            Arc::new(MemoryShippingCostsRepository::new(rates)),
        )
    }

    /// Build application context from a database URL.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails.
    pub async fn from_database_url(url: &str) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        let db = Db::new(pool);

        Ok(Self::new(
            Arc::new(PgBasketsRepository::new(db.clone())),
            Arc::new(PgDiscountDefinitionsRepository::new(db.clone())),
            Arc::new(PgShippingCostsRepository::new(db)),
        ))
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext").finish_non_exhaustive()
    }
}
