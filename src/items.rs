//! Items

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    num::NonZeroU64,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{discounts::ItemDiscount, pricing::PricingError};

/// Errors raised while constructing or mutating an item.
#[derive(Debug, Error, PartialEq)]
pub enum ItemError {
    /// Items need a name.
    #[error("product name is required")]
    EmptyName,

    /// Unit price must be above zero.
    #[error("unit price must be greater than zero")]
    NonPositiveUnitPrice,

    /// Quantity must be above zero.
    #[error("quantity must be greater than zero")]
    NonPositiveQuantity,

    /// Product ids are assigned by the backing store and are never zero.
    #[error("product id must be greater than zero")]
    InvalidProductId,

    /// Product ids can only be assigned once.
    #[error("product id {0} is already assigned")]
    ProductIdAlreadyAssigned(ProductId),

    /// Quantity increases must add at least one unit.
    #[error("quantity increase must be greater than zero")]
    NonPositiveIncrease,

    /// Merged quantity no longer fits.
    #[error("quantity overflowed")]
    QuantityOverflow,
}

/// Store assigned product identity of a basket line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(NonZeroU64);

impl ProductId {
    /// Create a product id.
    ///
    /// # Errors
    ///
    /// Returns [`ItemError::InvalidProductId`] for zero.
    pub fn new(id: u64) -> Result<Self, ItemError> {
        NonZeroU64::new(id).map(Self).ok_or(ItemError::InvalidProductId)
    }

    /// Numeric value.
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.0, f)
    }
}

impl TryFrom<u64> for ProductId {
    type Error = ItemError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A single basket line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ItemData")]
pub struct Item {
    #[serde(skip_serializing_if = "Option::is_none")]
    product_id: Option<ProductId>,
    name: String,
    unit_price: u64,
    quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    discount: Option<ItemDiscount>,
}

#[derive(Deserialize)]
struct ItemData {
    #[serde(default)]
    product_id: Option<ProductId>,
    name: String,
    unit_price: u64,
    quantity: u32,
    #[serde(default)]
    discount: Option<ItemDiscount>,
}

impl TryFrom<ItemData> for Item {
    type Error = ItemError;

    fn try_from(data: ItemData) -> Result<Self, Self::Error> {
        Self::build(
            data.product_id,
            data.name,
            data.unit_price,
            data.quantity,
            data.discount,
        )
    }
}

impl Item {
    /// Create an item that has not been persisted yet.
    ///
    /// # Errors
    ///
    /// Returns an [`ItemError`] if the name is blank or price or quantity are zero.
    pub fn new(
        name: impl Into<String>,
        unit_price: u64,
        quantity: u32,
        discount: Option<ItemDiscount>,
    ) -> Result<Self, ItemError> {
        Self::build(None, name.into(), unit_price, quantity, discount)
    }

    /// Rehydrate an item loaded from the backing store.
    ///
    /// # Errors
    ///
    /// Returns an [`ItemError`] if the name is blank or price or quantity are zero.
    pub fn from_store(
        product_id: ProductId,
        name: impl Into<String>,
        unit_price: u64,
        quantity: u32,
        discount: Option<ItemDiscount>,
    ) -> Result<Self, ItemError> {
        Self::build(Some(product_id), name.into(), unit_price, quantity, discount)
    }

    fn build(
        product_id: Option<ProductId>,
        name: String,
        unit_price: u64,
        quantity: u32,
        discount: Option<ItemDiscount>,
    ) -> Result<Self, ItemError> {
        if name.trim().is_empty() {
            return Err(ItemError::EmptyName);
        }

        if unit_price == 0 {
            return Err(ItemError::NonPositiveUnitPrice);
        }

        if quantity == 0 {
            return Err(ItemError::NonPositiveQuantity);
        }

        Ok(Self {
            product_id,
            name,
            unit_price,
            quantity,
            discount,
        })
    }

    /// Store assigned identity, if the item has been persisted.
    pub fn product_id(&self) -> Option<ProductId> {
        self.product_id
    }

    /// Product name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Price of one unit in minor units.
    pub fn unit_price(&self) -> u64 {
        self.unit_price
    }

    /// Number of units.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Attached item discount.
    pub fn discount(&self) -> Option<&ItemDiscount> {
        self.discount.as_ref()
    }

    /// Whether an item discount is attached.
    pub fn has_discount(&self) -> bool {
        self.discount.is_some()
    }

    /// Assign the store identity.
    ///
    /// # Errors
    ///
    /// Returns [`ItemError::ProductIdAlreadyAssigned`] if the item already has one.
    pub fn assign_product_id(&mut self, product_id: ProductId) -> Result<(), ItemError> {
        if let Some(existing) = self.product_id {
            return Err(ItemError::ProductIdAlreadyAssigned(existing));
        }

        self.product_id = Some(product_id);

        Ok(())
    }

    /// Add units to this line.
    ///
    /// # Errors
    ///
    /// - [`ItemError::NonPositiveIncrease`]: `amount` is zero.
    /// - [`ItemError::QuantityOverflow`]: the new quantity does not fit.
    pub fn increase_quantity(&mut self, amount: u32) -> Result<(), ItemError> {
        if amount == 0 {
            return Err(ItemError::NonPositiveIncrease);
        }

        self.quantity = self
            .quantity
            .checked_add(amount)
            .ok_or(ItemError::QuantityOverflow)?;

        Ok(())
    }

    /// Attach an item discount, replacing any existing one.
    pub fn apply_discount(&mut self, discount: ItemDiscount) {
        self.discount = Some(discount);
    }

    /// Line total with the item discount applied.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] if the total does not fit in a `u64`.
    pub fn total(&self) -> Result<u64, PricingError> {
        let total = match &self.discount {
            Some(discount) => discount.calculate_total(self.unit_price, self.quantity),
            None => self.unit_price.checked_mul(u64::from(self.quantity)),
        };

        total.ok_or(PricingError::Overflow)
    }

    /// Whether `other` refers to the same basket line.
    ///
    /// Persisted items match on product id, anything else on the case-insensitive name and
    /// unit price. The item discount must be equal in both cases.
    pub fn matches(&self, other: &Item) -> bool {
        if self.discount != other.discount {
            return false;
        }

        if let (Some(id), Some(other_id)) = (self.product_id, other.product_id) {
            return id == other_id;
        }

        self.unit_price == other.unit_price && self.name.to_lowercase() == other.name.to_lowercase()
    }

    /// Summary of the line as reported to callers.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] if the line total does not fit in a `u64`.
    pub fn summary(&self) -> Result<ItemSummary, PricingError> {
        Ok(ItemSummary {
            product_id: self.product_id,
            name: self.name.clone(),
            unit_price: self.unit_price,
            quantity: self.quantity,
            line_total: self.total()?,
            has_discount: self.has_discount(),
            discount_description: self.discount.map(ItemDiscount::description),
        })
    }
}

/// Reported shape of a basket line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSummary {
    /// Store assigned identity.
    pub product_id: Option<ProductId>,

    /// Product name.
    pub name: String,

    /// Price of one unit in minor units.
    pub unit_price: u64,

    /// Number of units.
    pub quantity: u32,

    /// Line total after the item discount.
    pub line_total: u64,

    /// Whether an item discount is attached.
    pub has_discount: bool,

    /// Description of the item discount.
    pub discount_description: Option<String>,
}
