//! Basket

use serde::{Deserialize, Serialize};

use crate::{
    definitions::DiscountDefinitionUuid,
    discounts::BasketDiscount,
    items::{Item, ItemError, ProductId},
    shipping::ShippingDetails,
    uuids::TypedUuid,
};

/// Basket UUID
pub type BasketUuid = TypedUuid<Basket>;

/// Mutable aggregate of items, shipping and an optional basket discount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Basket {
    uuid: BasketUuid,
    #[serde(default)]
    items: Vec<Item>,
    #[serde(default)]
    shipping: Option<ShippingDetails>,
    #[serde(default)]
    discount: Option<BasketDiscount>,
    #[serde(default)]
    discount_definition: Option<DiscountDefinitionUuid>,
    #[serde(default)]
    version: u64,
}

/// Stored state of a basket, used by repositories to rehydrate one.
#[derive(Debug, Clone)]
pub struct BasketParts {
    /// Basket identity.
    pub uuid: BasketUuid,

    /// Lines in insertion order.
    pub items: Vec<Item>,

    /// Selected shipping.
    pub shipping: Option<ShippingDetails>,

    /// Attached basket discount.
    pub discount: Option<BasketDiscount>,

    /// Definition backing the attached discount.
    pub discount_definition: Option<DiscountDefinitionUuid>,

    /// Concurrency token.
    pub version: u64,
}

impl Basket {
    /// Create an empty basket with a fresh identity.
    pub fn new() -> Self {
        Self::with_uuid(BasketUuid::new())
    }

    /// Create an empty basket with the given identity.
    pub fn with_uuid(uuid: BasketUuid) -> Self {
        Self {
            uuid,
            items: Vec::new(),
            shipping: None,
            discount: None,
            discount_definition: None,
            version: 0,
        }
    }

    /// Rehydrate a stored basket.
    pub fn from_parts(parts: BasketParts) -> Self {
        Self {
            uuid: parts.uuid,
            items: parts.items,
            shipping: parts.shipping,
            discount: parts.discount,
            discount_definition: parts.discount_definition,
            version: parts.version,
        }
    }

    /// Basket identity.
    pub fn uuid(&self) -> BasketUuid {
        self.uuid
    }

    /// Lines in insertion order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Find a line by product id.
    pub fn item(&self, product_id: ProductId) -> Option<&Item> {
        self.items
            .iter()
            .find(|item| item.product_id() == Some(product_id))
    }

    /// Find a line by product id for mutation.
    pub fn item_mut(&mut self, product_id: ProductId) -> Option<&mut Item> {
        self.items
            .iter_mut()
            .find(|item| item.product_id() == Some(product_id))
    }

    /// Selected shipping.
    pub fn shipping(&self) -> Option<&ShippingDetails> {
        self.shipping.as_ref()
    }

    /// Attached basket discount.
    pub fn discount(&self) -> Option<&BasketDiscount> {
        self.discount.as_ref()
    }

    /// Definition backing the attached discount.
    pub fn discount_definition(&self) -> Option<DiscountDefinitionUuid> {
        self.discount_definition
    }

    /// Concurrency token, incremented on every save.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the basket has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Merge `candidate` into a matching line, or append it as a new one.
    ///
    /// Returns the resulting line.
    ///
    /// # Errors
    ///
    /// Returns an [`ItemError`] if the merged quantity is invalid.
    pub fn add_or_update_item(&mut self, candidate: Item) -> Result<Item, ItemError> {
        if let Some(existing) = self.items.iter_mut().find(|item| item.matches(&candidate)) {
            existing.increase_quantity(candidate.quantity())?;

            return Ok(existing.clone());
        }

        self.items.push(candidate.clone());

        Ok(candidate)
    }

    /// Remove the line with the given product id.
    ///
    /// Returns `false` if there was no such line.
    pub fn remove_item(&mut self, product_id: ProductId) -> bool {
        let before = self.items.len();

        self.items
            .retain(|item| item.product_id() != Some(product_id));

        self.items.len() != before
    }

    /// Attach a basket discount, replacing any existing one.
    pub fn apply_discount(
        &mut self,
        discount: BasketDiscount,
        definition: Option<DiscountDefinitionUuid>,
    ) {
        self.discount = Some(discount);
        self.discount_definition = definition;
    }

    /// Select shipping, replacing any existing selection.
    pub fn set_shipping(&mut self, shipping: ShippingDetails) {
        self.shipping = Some(shipping);
    }

    /// Assign product ids to lines that don't have one yet, in order.
    ///
    /// # Errors
    ///
    /// Returns an [`ItemError`] if `next_id` produces an invalid id.
    pub fn assign_pending_product_ids(
        &mut self,
        mut next_id: impl FnMut() -> Result<ProductId, ItemError>,
    ) -> Result<(), ItemError> {
        for item in self
            .items
            .iter_mut()
            .filter(|item| item.product_id().is_none())
        {
            item.assign_product_id(next_id()?)?;
        }

        Ok(())
    }

    /// Move to the next version after a successful save.
    pub fn bump_version(&mut self) {
        self.version = self.version.saturating_add(1);
    }
}

impl Default for Basket {
    fn default() -> Self {
        Self::new()
    }
}
