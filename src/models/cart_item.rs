use bigdecimal::BigDecimal;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One product line in the cart, keyed by product id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: String,
    pub name: String,
    pub image_src: String,
    pub price: BigDecimal,
    pub quantity: u32,
}

/// The fields needed to put a product in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDisplayInfo {
    pub id: String,
    pub name: String,
    pub image_src: String,
    pub price: BigDecimal,
}

impl ItemDisplayInfo {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        image_src: impl Into<String>,
        price: BigDecimal,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            image_src: image_src.into(),
            price,
        }
    }
}

impl CartItem {
    /// A fresh line for a product added for the first time.
    pub fn from_display_info(info: ItemDisplayInfo) -> Self {
        Self {
            id: info.id,
            name: info.name,
            image_src: info.image_src,
            price: info.price,
            quantity: 1,
        }
    }

    pub fn line_total(&self) -> BigDecimal {
        &self.price * BigDecimal::from(self.quantity)
    }
}

/// Snapshot of everything the store holds.
///
/// Listeners receive this after every change. Items iterate in insertion
/// order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartState {
    pub is_open: bool,
    pub items: IndexMap<String, CartItem>,
}

impl CartState {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item_count(&self) -> u64 {
        self.items.values().map(|item| u64::from(item.quantity)).sum()
    }

    pub fn total(&self) -> BigDecimal {
        self.items
            .values()
            .fold(BigDecimal::from(0), |total, item| total + item.line_total())
    }

    pub fn items(&self) -> impl Iterator<Item = &CartItem> {
        self.items.values()
    }
}
