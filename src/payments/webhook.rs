//! Parsing of the processor's webhook payload into an order write.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

use crate::cart::MAX_LINE_QUANTITY;
use crate::domain::money::bounded;
use crate::domain::{Language, OrderCreate, OrderItemDraft, OrderStatus, ProductSnapshot, ShippingDetails};

const SUCCESS_EVENTS: [&str; 2] = ["charge.success", "transaction.success"];

fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Debug, Default, Deserialize)]
pub struct WebhookEvent {
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub data: WebhookData,
}

#[derive(Debug, Default, Deserialize)]
pub struct WebhookData {
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    /// Charged amount in cents.
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub customer: Option<Customer>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Customer {
    #[serde(default)]
    pub email: Option<String>,
}

/// The checkout metadata as it comes back; every field may be missing.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WebhookMetadata {
    pub shipping_details: Option<ShippingDetails>,
    #[serde(deserialize_with = "null_default")]
    pub cart: Vec<MetadataLine>,
    pub language_preference: Option<String>,
    pub subtotal: Option<Decimal>,
    pub shipping_cost: Option<Decimal>,
    pub user_id: Option<String>,
}

/// A cart line inside the metadata, in either camelCase or snake_case.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MetadataLine {
    pub id: Option<String>,
    #[serde(alias = "productId", alias = "sanity_product_id")]
    pub product_id: Option<String>,
    pub title: Option<String>,
    #[serde(alias = "optionsText")]
    pub options_text: Option<String>,
    pub image: Option<Value>,
    pub quantity: Option<u32>,
    #[serde(alias = "unit_price")]
    pub price: Option<Decimal>,
}

impl MetadataLine {
    fn into_draft(self) -> OrderItemDraft {
        let line_id = self.id.unwrap_or_default();
        OrderItemDraft {
            product_id: self.product_id.unwrap_or_else(|| line_id.clone()),
            snapshot: ProductSnapshot {
                title: self.title.unwrap_or_default(),
                options_text: self.options_text.unwrap_or_default(),
                image: self.image.as_ref().and_then(Value::as_str).map(str::to_string),
                line_id,
            },
            quantity: self.quantity.unwrap_or(1).clamp(1, MAX_LINE_QUANTITY),
            unit_price: self.price.and_then(bounded).unwrap_or_default(),
        }
    }
}

impl WebhookEvent {
    /// Either a success event name or a successful data status counts.
    pub fn is_success(&self) -> bool {
        let name = self
            .event
            .as_deref()
            .or(self.event_type.as_deref())
            .unwrap_or_default();
        SUCCESS_EVENTS.contains(&name) || self.data.status.as_deref() == Some("success")
    }

    pub fn reference(&self) -> Option<&str> {
        self.data
            .reference
            .as_deref()
            .map(str::trim)
            .filter(|reference| !reference.is_empty())
    }

    /// Metadata may arrive as an object or as a JSON-encoded string.
    pub fn metadata(&self) -> WebhookMetadata {
        let value = match &self.data.metadata {
            None | Some(Value::Null) => return WebhookMetadata::default(),
            Some(Value::String(raw)) => match serde_json::from_str::<Value>(raw) {
                Ok(value) => value,
                Err(e) => {
                    warn!(error = %e, "Metadata string is not JSON, ignoring it");
                    return WebhookMetadata::default();
                }
            },
            Some(value) => value.clone(),
        };
        serde_json::from_value(value).unwrap_or_else(|e| {
            warn!(error = %e, "Metadata has an unexpected shape, ignoring it");
            WebhookMetadata::default()
        })
    }

    /// Builds the paid-order write for this event.
    ///
    /// Shipping comes from the metadata, else `flat_shipping`. The subtotal
    /// comes from the metadata, else the charged amount minus shipping.
    pub fn to_order(&self, reference: &str, flat_shipping: Decimal) -> OrderCreate {
        let metadata = self.metadata();

        let shipping_cost = metadata
            .shipping_cost
            .and_then(bounded)
            .unwrap_or(flat_shipping);
        let subtotal = metadata
            .subtotal
            .and_then(bounded)
            .or_else(|| {
                let charged = self.data.amount?.checked_div(Decimal::ONE_HUNDRED)?;
                bounded(charged.checked_sub(shipping_cost)?.max(Decimal::ZERO))
            })
            .unwrap_or_default();

        let mut shipping_details = metadata.shipping_details.unwrap_or_default();
        if shipping_details.email.trim().is_empty() {
            if let Some(email) = self.data.customer.as_ref().and_then(|c| c.email.as_deref()) {
                shipping_details.email = email.trim().to_lowercase();
            }
        }

        let language = metadata
            .language_preference
            .as_deref()
            .and_then(|code| code.parse::<Language>().ok())
            .unwrap_or_default();

        OrderCreate {
            reference: reference.to_string(),
            user_id: metadata.user_id.filter(|id| !id.trim().is_empty()),
            status: OrderStatus::Paid,
            shipping_details,
            language,
            subtotal,
            shipping_cost,
            items: metadata.cart.into_iter().map(MetadataLine::into_draft).collect(),
        }
    }
}
