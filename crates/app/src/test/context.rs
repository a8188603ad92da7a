//! Test context for service-level tests.

use std::sync::Arc;

use crate::domain::{
    baskets::{DefaultBasketsService, repositories::MemoryBasketsRepository},
    discounts::{RepositoryDiscountCatalog, repositories::MemoryDiscountDefinitionsRepository},
    shipping::{
        RatesShippingPolicy, rates::ShippingRates, repositories::MemoryShippingCostsRepository,
    },
    totals::CatalogTotalsCalculator,
};

/// Services wired over in-memory repositories, with UK shipping at 499.
pub(crate) struct TestContext {
    pub baskets: DefaultBasketsService,
    pub catalog: Arc<RepositoryDiscountCatalog>,
    pub definitions: Arc<MemoryDiscountDefinitionsRepository>,
    pub shipping_costs: Arc<MemoryShippingCostsRepository>,
}

impl TestContext {
    pub fn new() -> Self {
        let definitions = Arc::new(MemoryDiscountDefinitionsRepository::new());
        let catalog = Arc::new(RepositoryDiscountCatalog::new(definitions.clone()));

        let shipping_costs = Arc::new(MemoryShippingCostsRepository::new(
            ShippingRates::standard(),
        ));

        let baskets = DefaultBasketsService::new(
            Arc::new(MemoryBasketsRepository::new()),
            catalog.clone(),
            Arc::new(RatesShippingPolicy::new(shipping_costs.clone())),
            Arc::new(CatalogTotalsCalculator::new(catalog.clone())),
        );

        Self {
            baskets,
            catalog,
            definitions,
            shipping_costs,
        }
    }
}
