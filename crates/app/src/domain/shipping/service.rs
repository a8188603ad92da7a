//! Shipping Policy

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use tracing::{debug, warn};
use trolley::shipping::{Country, DEFAULT_SHIPPING_COST, ShippingDetails};

use crate::domain::shipping::{ShippingError, repositories::ShippingCostsRepository};

/// Resolves destinations against a table of per-country rates.
#[derive(Clone)]
pub struct RatesShippingPolicy {
    repository: Arc<dyn ShippingCostsRepository>,
}

impl RatesShippingPolicy {
    #[must_use]
    pub fn new(repository: Arc<dyn ShippingCostsRepository>) -> Self {
        Self { repository }
    }
}

impl std::fmt::Debug for RatesShippingPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RatesShippingPolicy").finish_non_exhaustive()
    }
}

#[async_trait]
impl ShippingPolicy for RatesShippingPolicy {
    #[tracing::instrument(name = "shipping.policy.resolve", skip(self), err)]
    async fn resolve(&self, country: &str) -> Result<ShippingDetails, ShippingError> {
        let Some(resolved) = Country::parse(country) else {
            warn!(country, "unknown shipping destination, using default cost");

            return Ok(ShippingDetails::fallback());
        };

        let cost = match self.repository.get_cost(resolved).await? {
            Some(cost) => cost,
            None => {
                debug!(country = %resolved, "no shipping rate configured, using default cost");

                DEFAULT_SHIPPING_COST
            }
        };

        Ok(ShippingDetails::new(resolved, cost))
    }
}

#[automock]
#[async_trait]
pub trait ShippingPolicy: Send + Sync {
    /// Resolve a destination given as an alias, name or numeric code.
    ///
    /// Unknown destinations resolve to the default cost instead of failing.
    async fn resolve(&self, country: &str) -> Result<ShippingDetails, ShippingError>;
}
