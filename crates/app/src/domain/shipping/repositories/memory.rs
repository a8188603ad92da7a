//! In-memory Shipping Costs Repository

use async_trait::async_trait;
use tokio::sync::RwLock;
use trolley::shipping::Country;

use crate::{domain::shipping::rates::ShippingRates, repository::RepositoryError};

use super::ShippingCostsRepository;

#[derive(Debug, Default)]
pub struct MemoryShippingCostsRepository {
    rates: RwLock<ShippingRates>,
}

impl MemoryShippingCostsRepository {
    #[must_use]
    pub fn new(rates: ShippingRates) -> Self {
        Self {
            rates: RwLock::new(rates),
        }
    }

    /// Set the cost for a single country.
    pub async fn set_cost(&self, country: Country, cost: u64) {
        self.rates.write().await.insert(country, cost);
    }
}

#[async_trait]
impl ShippingCostsRepository for MemoryShippingCostsRepository {
    async fn get_cost(&self, country: Country) -> Result<Option<u64>, RepositoryError> {
        Ok(self.rates.read().await.get(country))
    }
}
