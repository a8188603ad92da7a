//! In-memory Baskets Repository

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use tokio::sync::RwLock;
use trolley::{
    basket::{Basket, BasketUuid},
    items::ProductId,
};

use crate::repository::RepositoryError;

use super::BasketsRepository;

#[derive(Debug, Default)]
struct State {
    baskets: FxHashMap<BasketUuid, Basket>,
    order: Vec<BasketUuid>,
    last_product_id: u64,
}

#[derive(Debug, Default)]
pub struct MemoryBasketsRepository {
    state: RwLock<State>,
}

impl MemoryBasketsRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BasketsRepository for MemoryBasketsRepository {
    async fn get_basket(&self, uuid: BasketUuid) -> Result<Basket, RepositoryError> {
        self.state
            .read()
            .await
            .baskets
            .get(&uuid)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn list_baskets(&self) -> Result<Vec<Basket>, RepositoryError> {
        let state = self.state.read().await;

        Ok(state
            .order
            .iter()
            .filter_map(|uuid| state.baskets.get(uuid))
            .cloned()
            .collect())
    }

    async fn create_basket(&self, basket: &Basket) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;

        if state.baskets.contains_key(&basket.uuid()) {
            return Err(RepositoryError::AlreadyExists);
        }

        state.order.push(basket.uuid());
        state.baskets.insert(basket.uuid(), basket.clone());

        Ok(())
    }

    async fn save_basket(&self, basket: &Basket) -> Result<Basket, RepositoryError> {
        let mut state = self.state.write().await;

        let State {
            baskets,
            last_product_id,
            ..
        } = &mut *state;

        let stored = baskets
            .get(&basket.uuid())
            .ok_or(RepositoryError::NotFound)?;

        if stored.version() != basket.version() {
            return Err(RepositoryError::Stale {
                loaded: basket.version(),
                stored: stored.version(),
            });
        }

        let mut saved = basket.clone();

        saved
            .assign_pending_product_ids(|| {
                *last_product_id += 1;
                ProductId::new(*last_product_id)
            })
            .map_err(|error| RepositoryError::InvalidData(error.to_string()))?;

        saved.bump_version();

        baskets.insert(saved.uuid(), saved.clone());

        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;
    use trolley::items::Item;

    use super::*;

    #[tokio::test]
    async fn get_unknown_basket_returns_not_found() {
        let repository = MemoryBasketsRepository::new();

        let result = repository.get_basket(BasketUuid::new()).await;

        assert!(
            matches!(result, Err(RepositoryError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn create_duplicate_basket_returns_already_exists() -> TestResult {
        let repository = MemoryBasketsRepository::new();
        let basket = Basket::new();

        repository.create_basket(&basket).await?;

        let result = repository.create_basket(&basket).await;

        assert!(
            matches!(result, Err(RepositoryError::AlreadyExists)),
            "expected AlreadyExists, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn save_assigns_product_ids_and_bumps_version() -> TestResult {
        let repository = MemoryBasketsRepository::new();
        let mut basket = Basket::new();

        repository.create_basket(&basket).await?;

        basket.add_or_update_item(Item::new("Coffee", 500, 1, None)?)?;
        basket.add_or_update_item(Item::new("Mug", 200, 1, None)?)?;

        let saved = repository.save_basket(&basket).await?;

        let ids: Vec<_> = saved
            .items()
            .iter()
            .filter_map(Item::product_id)
            .map(ProductId::get)
            .collect();

        assert_eq!(ids, [1, 2]);
        assert_eq!(saved.version(), 1);
        assert_eq!(repository.get_basket(basket.uuid()).await?, saved);

        Ok(())
    }

    #[tokio::test]
    async fn product_ids_are_unique_across_baskets() -> TestResult {
        let repository = MemoryBasketsRepository::new();

        let mut first = Basket::new();
        let mut second = Basket::new();

        repository.create_basket(&first).await?;
        repository.create_basket(&second).await?;

        first.add_or_update_item(Item::new("Coffee", 500, 1, None)?)?;
        second.add_or_update_item(Item::new("Coffee", 500, 1, None)?)?;

        let first = repository.save_basket(&first).await?;
        let second = repository.save_basket(&second).await?;

        assert_ne!(
            first.items().first().and_then(Item::product_id),
            second.items().first().and_then(Item::product_id)
        );

        Ok(())
    }

    #[tokio::test]
    async fn stale_save_is_rejected() -> TestResult {
        let repository = MemoryBasketsRepository::new();
        let basket = Basket::new();

        repository.create_basket(&basket).await?;

        let mut first = repository.get_basket(basket.uuid()).await?;
        let mut second = repository.get_basket(basket.uuid()).await?;

        first.add_or_update_item(Item::new("Coffee", 500, 1, None)?)?;
        repository.save_basket(&first).await?;

        second.add_or_update_item(Item::new("Tea", 300, 1, None)?)?;

        let result = repository.save_basket(&second).await;

        assert!(
            matches!(result, Err(RepositoryError::Stale { loaded: 0, stored: 1 })),
            "expected Stale, got {result:?}"
        );

        let stored = repository.get_basket(basket.uuid()).await?;

        assert_eq!(stored.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn list_baskets_in_creation_order() -> TestResult {
        let repository = MemoryBasketsRepository::new();

        let first = Basket::new();
        let second = Basket::new();

        repository.create_basket(&first).await?;
        repository.create_basket(&second).await?;

        let uuids: Vec<_> = repository
            .list_baskets()
            .await?
            .iter()
            .map(Basket::uuid)
            .collect();

        assert_eq!(uuids, [first.uuid(), second.uuid()]);

        Ok(())
    }
}
