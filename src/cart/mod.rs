//! Cart state: line items keyed by their configured line id.

mod storage;

pub use storage::{CartError, CartStorage, CART_FILE_NAME};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Quantity ceiling for a single cart line.
pub const MAX_LINE_QUANTITY: u32 = 100;

/// One configured product in the cart.
///
/// `id` is the composite line id (`{productId}-{colour}-{options}`), so two
/// adds of the same configuration land on the same line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: String,
    #[serde(alias = "product_id", alias = "sanity_product_id")]
    pub product_id: String,
    pub title: String,
    #[serde(alias = "unit_price")]
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, alias = "options_text")]
    pub options_text: String,
    pub quantity: u32,
}

impl CartItem {
    /// `price × quantity`, or `None` on overflow.
    pub fn line_total(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity))
    }
}

/// Checked sum of `price × quantity` over `items`.
pub fn sum_lines(items: &[CartItem]) -> Option<Decimal> {
    items
        .iter()
        .try_fold(Decimal::ZERO, |total, item| total.checked_add(item.line_total()?))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new(items: Vec<CartItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Adds a line, or bumps the quantity of the matching line.
    pub fn add(&mut self, item: CartItem) {
        match self.items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => {
                existing.quantity = existing
                    .quantity
                    .saturating_add(item.quantity)
                    .min(MAX_LINE_QUANTITY);
                debug!(line_id = %existing.id, quantity = existing.quantity, "Cart line incremented");
            }
            None => {
                let mut item = item;
                item.quantity = item.quantity.clamp(1, MAX_LINE_QUANTITY);
                debug!(line_id = %item.id, "Cart line added");
                self.items.push(item);
            }
        }
    }

    /// Returns `true` if a line was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of the line totals, or `None` if it does not fit in a `Decimal`.
    pub fn total(&self) -> Option<Decimal> {
        sum_lines(&self.items)
    }

    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
