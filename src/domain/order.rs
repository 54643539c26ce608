use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Language, ShippingDetails};

/// Lifecycle of an order, from checkout through fulfilment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Processing,
    Shipped,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Paid,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown order status: {s}"))
    }
}

/// Frozen copy of what the buyer picked, independent of the live catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub line_id: String,
    pub title: String,
    #[serde(default)]
    pub options_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// One purchased line of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: String,
    pub snapshot: ProductSnapshot,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
}

/// An order line before it is attached to an order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItemDraft {
    pub product_id: String,
    pub snapshot: ProductSnapshot,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl OrderItem {
    /// Prices a draft line. Fails when `unit_price × quantity` overflows.
    pub fn from_draft(order_id: Uuid, draft: OrderItemDraft) -> Result<Self, String> {
        let total_price = draft
            .unit_price
            .checked_mul(Decimal::from(draft.quantity))
            .ok_or_else(|| format!("amount overflow on line {}", draft.snapshot.line_id))?;
        Ok(Self {
            id: Uuid::new_v4(),
            order_id,
            total_price,
            product_id: draft.product_id,
            snapshot: draft.snapshot,
            quantity: draft.quantity,
            unit_price: draft.unit_price,
            created_at: Utc::now(),
        })
    }
}

/// A customer order, keyed by the payment processor's reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub reference: String,
    pub user_id: Option<String>,
    pub status: OrderStatus,
    pub shipping_details: ShippingDetails,
    pub language: Language,
    pub subtotal: Decimal,
    pub shipping_cost: Decimal,
    pub total: Decimal,
    pub tracking_number: Option<String>,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn buyer_email(&self) -> &str {
        &self.shipping_details.email
    }
}

/// Payload for recording a new order.
///
/// Carries no total: it is derived from `subtotal + shipping_cost` when the
/// order is created.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub reference: String,
    pub user_id: Option<String>,
    pub status: OrderStatus,
    pub shipping_details: ShippingDetails,
    pub language: Language,
    pub subtotal: Decimal,
    pub shipping_cost: Decimal,
    pub items: Vec<OrderItemDraft>,
}

/// Admin-side changes to an order. Money fields cannot be patched.
#[derive(Debug, Clone, Default)]
pub struct OrderPatch {
    pub status: Option<OrderStatus>,
    pub tracking_number: Option<String>,
}
