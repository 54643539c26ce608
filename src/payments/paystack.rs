use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::PaymentError;
use crate::cart::CartItem;
use crate::domain::{Language, ShippingDetails};

pub const DEFAULT_BASE_URL: &str = "https://api.paystack.co";

/// Checkout context echoed back by the processor on the webhook.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentMetadata {
    pub shipping_details: ShippingDetails,
    pub cart: Vec<CartItem>,
    pub language_preference: Language,
    pub subtotal: Decimal,
    pub shipping_cost: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Body of `POST /transaction/initialize`. `amount` is in cents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InitializeTransaction {
    pub email: String,
    pub amount: i64,
    pub callback_url: String,
    pub metadata: PaymentMetadata,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InitializedTransaction {
    pub authorization_url: String,
    #[serde(default)]
    pub access_code: String,
    pub reference: String,
}

#[derive(Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    message: String,
    data: Option<T>,
}

/// A hosted payment page provider.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn initialize(&self, request: &InitializeTransaction) -> Result<InitializedTransaction, PaymentError>;
}

pub struct PaystackGateway {
    client: Client,
    base_url: String,
    secret_key: String,
}

impl PaystackGateway {
    pub fn new(base_url: impl Into<String>, secret_key: impl Into<String>) -> Result<Self, PaymentError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(20))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            secret_key: secret_key.into(),
        })
    }
}

#[async_trait]
impl PaymentGateway for PaystackGateway {
    #[instrument(skip(self, request), fields(amount = request.amount))]
    async fn initialize(&self, request: &InitializeTransaction) -> Result<InitializedTransaction, PaymentError> {
        let response = self
            .client
            .post(format!("{}/transaction/initialize", self.base_url))
            .bearer_auth(&self.secret_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let envelope: Envelope<InitializedTransaction> =
            serde_json::from_str(&body).map_err(|e| PaymentError::Provider {
                status: status.as_u16(),
                message: format!("undecodable response: {e}"),
            })?;

        match envelope.data {
            Some(data) if status.is_success() => {
                debug!(reference = %data.reference, "Transaction initialized");
                Ok(data)
            }
            _ => Err(PaymentError::Provider {
                status: status.as_u16(),
                message: envelope.message,
            }),
        }
    }
}
