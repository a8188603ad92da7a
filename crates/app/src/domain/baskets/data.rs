//! Basket Data

use serde::{Deserialize, Serialize};
use trolley::{
    basket::Basket,
    discounts::ItemDiscount,
    items::{Item, ItemError},
    pricing::Totals,
};

/// Item to add to a basket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub unit_price: u64,
    pub quantity: u32,
    #[serde(default)]
    pub discount: Option<ItemDiscount>,
}

impl NewItem {
    /// Validate into a pending basket line.
    ///
    /// # Errors
    ///
    /// Returns an [`ItemError`] if the name is blank or price or quantity are zero.
    pub fn into_item(self) -> Result<Item, ItemError> {
        Item::new(self.name, self.unit_price, self.quantity, self.discount)
    }
}

/// A stored basket together with its totals at the time it was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasketSnapshot {
    pub basket: Basket,
    pub totals: Totals,
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn new_item_deserializes_with_optional_discount() -> TestResult {
        let items: Vec<NewItem> = serde_norway::from_str(
            "- name: Coffee\n  unit_price: 500\n  quantity: 1\n\
             - name: Mug\n  unit_price: 200\n  quantity: 2\n  discount:\n    type: flat_amount\n    amount_taken: 50\n",
        )?;

        assert_eq!(items.len(), 2);
        assert_eq!(items.first().and_then(|item| item.discount), None);
        assert_eq!(
            items.get(1).and_then(|item| item.discount),
            Some(ItemDiscount::flat_amount(50)?)
        );

        Ok(())
    }

    #[test]
    fn into_item_validates() {
        let item = NewItem {
            name: "Coffee".to_string(),
            unit_price: 0,
            quantity: 1,
            discount: None,
        };

        assert_eq!(item.into_item(), Err(ItemError::NonPositiveUnitPrice));
    }
}
