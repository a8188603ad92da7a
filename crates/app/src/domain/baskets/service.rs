//! Baskets service.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use rust_decimal::Decimal;
use tracing::{Span, info};
use trolley::{
    basket::{Basket, BasketUuid},
    discounts::{ItemDiscount, PercentageDiscount},
    items::{Item, ItemSummary, ProductId},
    pricing::{ItemTotals, Totals, item_totals},
};

use crate::domain::{
    baskets::{
        BasketsServiceError,
        data::{BasketSnapshot, NewItem},
        repositories::BasketsRepository,
    },
    discounts::DiscountCatalog,
    shipping::ShippingPolicy,
    totals::TotalsCalculator,
};

/// Basket workflows: load, mutate, save, then price.
#[derive(Clone)]
pub struct DefaultBasketsService {
    baskets: Arc<dyn BasketsRepository>,
    catalog: Arc<dyn DiscountCatalog>,
    shipping: Arc<dyn ShippingPolicy>,
    totals: Arc<dyn TotalsCalculator>,
}

impl DefaultBasketsService {
    #[must_use]
    pub fn new(
        baskets: Arc<dyn BasketsRepository>,
        catalog: Arc<dyn DiscountCatalog>,
        shipping: Arc<dyn ShippingPolicy>,
        totals: Arc<dyn TotalsCalculator>,
    ) -> Self {
        Self {
            baskets,
            catalog,
            shipping,
            totals,
        }
    }

    async fn snapshot(&self, basket: Basket) -> Result<BasketSnapshot, BasketsServiceError> {
        let totals = self.totals.calculate(&basket).await?;

        Ok(BasketSnapshot { basket, totals })
    }

    async fn load_item(
        &self,
        basket: BasketUuid,
        product_id: ProductId,
    ) -> Result<Item, BasketsServiceError> {
        self.baskets
            .get_basket(basket)
            .await?
            .item(product_id)
            .cloned()
            .ok_or(BasketsServiceError::ItemNotFound(product_id))
    }
}

impl std::fmt::Debug for DefaultBasketsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultBasketsService")
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl BasketsService for DefaultBasketsService {
    #[tracing::instrument(
        name = "baskets.service.create_basket",
        skip(self),
        fields(basket_uuid = tracing::field::Empty),
        err
    )]
    async fn create_basket(&self) -> Result<Basket, BasketsServiceError> {
        let basket = Basket::new();

        self.baskets.create_basket(&basket).await?;

        Span::current().record("basket_uuid", tracing::field::display(basket.uuid()));

        info!(basket_uuid = %basket.uuid(), "created basket");

        Ok(basket)
    }

    #[tracing::instrument(name = "baskets.service.get_basket", skip(self), fields(basket_uuid = %uuid), err)]
    async fn get_basket(&self, uuid: BasketUuid) -> Result<BasketSnapshot, BasketsServiceError> {
        let basket = self.baskets.get_basket(uuid).await?;

        self.snapshot(basket).await
    }

    #[tracing::instrument(
        name = "baskets.service.list_baskets",
        skip(self),
        fields(basket_count = tracing::field::Empty),
        err
    )]
    async fn list_baskets(&self) -> Result<Vec<BasketSnapshot>, BasketsServiceError> {
        let baskets = self.baskets.list_baskets().await?;

        Span::current().record("basket_count", baskets.len());

        let mut snapshots = Vec::with_capacity(baskets.len());

        for basket in baskets {
            snapshots.push(self.snapshot(basket).await?);
        }

        Ok(snapshots)
    }

    #[tracing::instrument(
        name = "baskets.service.add_items",
        skip(self, items),
        fields(basket_uuid = %uuid, item_count = items.len()),
        err
    )]
    async fn add_items(
        &self,
        uuid: BasketUuid,
        items: Vec<NewItem>,
    ) -> Result<BasketSnapshot, BasketsServiceError> {
        if items.is_empty() {
            return Err(BasketsServiceError::NoItems);
        }

        let items = items
            .into_iter()
            .map(NewItem::into_item)
            .collect::<Result<Vec<_>, _>>()?;

        let mut basket = self.baskets.get_basket(uuid).await?;

        for item in items {
            basket.add_or_update_item(item)?;
        }

        let saved = self.baskets.save_basket(&basket).await?;

        info!(basket_uuid = %uuid, lines = saved.len(), "added items to basket");

        self.snapshot(saved).await
    }

    #[tracing::instrument(
        name = "baskets.service.remove_item",
        skip(self),
        fields(basket_uuid = %uuid, product_id = %product_id),
        err
    )]
    async fn remove_item(
        &self,
        uuid: BasketUuid,
        product_id: ProductId,
    ) -> Result<BasketSnapshot, BasketsServiceError> {
        let mut basket = self.baskets.get_basket(uuid).await?;

        if !basket.remove_item(product_id) {
            return Err(BasketsServiceError::ItemNotFound(product_id));
        }

        let saved = self.baskets.save_basket(&basket).await?;

        info!(basket_uuid = %uuid, product_id = %product_id, "removed item from basket");

        self.snapshot(saved).await
    }

    #[tracing::instrument(
        name = "baskets.service.get_item",
        skip(self),
        fields(basket_uuid = %uuid, product_id = %product_id),
        err
    )]
    async fn get_item(
        &self,
        uuid: BasketUuid,
        product_id: ProductId,
    ) -> Result<ItemSummary, BasketsServiceError> {
        Ok(self.load_item(uuid, product_id).await?.summary()?)
    }

    #[tracing::instrument(
        name = "baskets.service.get_item_totals",
        skip(self),
        fields(basket_uuid = %uuid, product_id = %product_id),
        err
    )]
    async fn get_item_totals(
        &self,
        uuid: BasketUuid,
        product_id: ProductId,
    ) -> Result<ItemTotals, BasketsServiceError> {
        Ok(item_totals(&self.load_item(uuid, product_id).await?)?)
    }

    #[tracing::instrument(
        name = "baskets.service.apply_item_discount",
        skip(self),
        fields(basket_uuid = %uuid, product_id = %product_id),
        err
    )]
    async fn apply_item_discount(
        &self,
        uuid: BasketUuid,
        product_id: ProductId,
        discount: ItemDiscount,
    ) -> Result<ItemSummary, BasketsServiceError> {
        let mut basket = self.baskets.get_basket(uuid).await?;

        basket
            .item_mut(product_id)
            .ok_or(BasketsServiceError::ItemNotFound(product_id))?
            .apply_discount(discount);

        let saved = self.baskets.save_basket(&basket).await?;

        info!(
            basket_uuid = %uuid,
            product_id = %product_id,
            discount = %discount.description(),
            "applied item discount"
        );

        Ok(saved
            .item(product_id)
            .ok_or(BasketsServiceError::ItemNotFound(product_id))?
            .summary()?)
    }

    #[tracing::instrument(
        name = "baskets.service.apply_discount_code",
        skip(self),
        fields(basket_uuid = %uuid, definition_uuid = tracing::field::Empty),
        err
    )]
    async fn apply_discount_code(
        &self,
        uuid: BasketUuid,
        code: &str,
        percentage: Decimal,
    ) -> Result<BasketSnapshot, BasketsServiceError> {
        let mut basket = self.baskets.get_basket(uuid).await?;

        let definition = self.catalog.ensure_definition(code, percentage).await?;

        Span::current().record("definition_uuid", tracing::field::display(definition.uuid));

        let discount = PercentageDiscount::new(definition.code, percentage)?;

        basket.apply_discount(discount.into(), Some(definition.uuid));

        let saved = self.baskets.save_basket(&basket).await?;

        info!(basket_uuid = %uuid, code, "applied discount code");

        self.snapshot(saved).await
    }

    #[tracing::instrument(
        name = "baskets.service.add_shipping",
        skip(self),
        fields(basket_uuid = %uuid, shipping_cost = tracing::field::Empty),
        err
    )]
    async fn add_shipping(
        &self,
        uuid: BasketUuid,
        country: &str,
    ) -> Result<Totals, BasketsServiceError> {
        let mut basket = self.baskets.get_basket(uuid).await?;

        let shipping = self.shipping.resolve(country).await?;

        Span::current().record("shipping_cost", shipping.cost);

        basket.set_shipping(shipping);

        let saved = self.baskets.save_basket(&basket).await?;

        Ok(self.totals.calculate(&saved).await?)
    }

    #[tracing::instrument(name = "baskets.service.get_totals", skip(self), fields(basket_uuid = %uuid), err)]
    async fn get_totals(&self, uuid: BasketUuid) -> Result<Totals, BasketsServiceError> {
        let basket = self.baskets.get_basket(uuid).await?;

        Ok(self.totals.calculate(&basket).await?)
    }
}

#[automock]
#[async_trait]
pub trait BasketsService: Send + Sync {
    /// Create and store an empty basket.
    async fn create_basket(&self) -> Result<Basket, BasketsServiceError>;

    /// Retrieve a basket with its current totals.
    async fn get_basket(&self, uuid: BasketUuid) -> Result<BasketSnapshot, BasketsServiceError>;

    /// Retrieve every basket with its current totals.
    async fn list_baskets(&self) -> Result<Vec<BasketSnapshot>, BasketsServiceError>;

    /// Add one or more items, merging each into a matching line.
    ///
    /// Every item is validated before the basket is touched.
    async fn add_items(
        &self,
        uuid: BasketUuid,
        items: Vec<NewItem>,
    ) -> Result<BasketSnapshot, BasketsServiceError>;

    /// Remove a line.
    async fn remove_item(
        &self,
        uuid: BasketUuid,
        product_id: ProductId,
    ) -> Result<BasketSnapshot, BasketsServiceError>;

    async fn get_item(
        &self,
        uuid: BasketUuid,
        product_id: ProductId,
    ) -> Result<ItemSummary, BasketsServiceError>;

    /// Line total of one item with its VAT.
    async fn get_item_totals(
        &self,
        uuid: BasketUuid,
        product_id: ProductId,
    ) -> Result<ItemTotals, BasketsServiceError>;

    /// Attach or replace the discount of a line.
    async fn apply_item_discount(
        &self,
        uuid: BasketUuid,
        product_id: ProductId,
        discount: ItemDiscount,
    ) -> Result<ItemSummary, BasketsServiceError>;

    /// Attach a discount code, registering it in the catalog when new.
    async fn apply_discount_code(
        &self,
        uuid: BasketUuid,
        code: &str,
        percentage: Decimal,
    ) -> Result<BasketSnapshot, BasketsServiceError>;

    /// Select shipping to a destination and return the new totals.
    async fn add_shipping(
        &self,
        uuid: BasketUuid,
        country: &str,
    ) -> Result<Totals, BasketsServiceError>;

    async fn get_totals(&self, uuid: BasketUuid) -> Result<Totals, BasketsServiceError>;
}
