use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn, Instrument};

use super::paystack::{InitializeTransaction, PaymentGateway, PaymentMetadata};
use super::signature;
use super::webhook::WebhookEvent;
use super::PaymentError;
use crate::cart::CartItem;
use crate::clients::{ConfirmOutcome, OrderClient, ProfileClient};
use crate::domain::money::to_cents;
use crate::domain::{Order, OrderCreate, OrderStatus, ShippingDetails};
use crate::notifications::{order_confirmation, Mailer};
use crate::validation::{validate_payment_init, FieldError};

/// Body of `POST /api/paystack/init`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PaymentInitRequest {
    pub email: String,
    /// Optional client-side amount in cents, checked but never charged.
    pub amount: Option<Decimal>,
    pub shipping_details: ShippingDetails,
    pub cart: Vec<CartItem>,
    pub language_preference: Option<String>,
    pub subtotal: Option<Decimal>,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentInitResponse {
    pub authorization_url: String,
    pub reference: String,
}

/// Result of processing one webhook delivery.
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookOutcome {
    /// Not a success event; nothing was written.
    Ignored,
    /// A paid order now exists where there was none or a pending one.
    Recorded { reference: String, promoted: bool },
    /// This payment was already applied.
    Duplicate { reference: String, status: OrderStatus },
}

#[derive(Debug, Clone)]
pub struct PaymentSettings {
    pub secret_key: String,
    pub app_url: String,
    pub shipping_cost: Decimal,
}

/// Payment bridge: starts hosted checkouts and reconciles webhook deliveries
/// with the order store.
#[derive(Clone)]
pub struct PaymentService {
    gateway: Arc<dyn PaymentGateway>,
    mailer: Arc<dyn Mailer>,
    orders: OrderClient,
    profiles: ProfileClient,
    settings: PaymentSettings,
}

impl PaymentService {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        mailer: Arc<dyn Mailer>,
        orders: OrderClient,
        profiles: ProfileClient,
        settings: PaymentSettings,
    ) -> Self {
        Self {
            gateway,
            mailer,
            orders,
            profiles,
            settings,
        }
    }

    /// Validates the checkout, opens a hosted payment session and records a
    /// pending order in the background.
    #[instrument(skip(self, request))]
    pub async fn initialize(&self, request: PaymentInitRequest) -> Result<PaymentInitResponse, PaymentError> {
        let checkout =
            validate_payment_init(&request, self.settings.shipping_cost).map_err(PaymentError::Validation)?;

        if let Some(user_id) = &checkout.user_id {
            if !self.profiles.profile_exists(user_id).await? {
                return Err(PaymentError::Validation(vec![FieldError::new(
                    "user_id",
                    "Unknown user",
                )]));
            }
        }

        let shipping_cost = self.settings.shipping_cost;
        let amount = checkout
            .subtotal
            .checked_add(shipping_cost)
            .and_then(to_cents)
            .ok_or_else(|| PaymentError::Validation(vec![FieldError::new("amount", "Amount exceeds maximum")]))?;
        let callback_url = format!(
            "{}/{}/payment/complete",
            self.settings.app_url.trim_end_matches('/'),
            checkout.language
        );

        let transaction = self
            .gateway
            .initialize(&InitializeTransaction {
                email: checkout.email.clone(),
                amount,
                callback_url,
                metadata: PaymentMetadata {
                    shipping_details: checkout.shipping_details.clone(),
                    cart: checkout.cart.clone(),
                    language_preference: checkout.language,
                    subtotal: checkout.subtotal,
                    shipping_cost,
                    user_id: checkout.user_id.clone(),
                },
            })
            .await?;
        info!(reference = %transaction.reference, amount, "Payment session opened");

        self.spawn_pending_order(OrderCreate {
            reference: transaction.reference.clone(),
            user_id: checkout.user_id,
            status: OrderStatus::Pending,
            shipping_details: checkout.shipping_details,
            language: checkout.language,
            subtotal: checkout.subtotal,
            shipping_cost,
            items: Vec::new(),
        });

        Ok(PaymentInitResponse {
            authorization_url: transaction.authorization_url,
            reference: transaction.reference,
        })
    }

    /// Writes the pending order off the response path. Failures are logged only.
    fn spawn_pending_order(&self, params: OrderCreate) {
        let orders = self.orders.clone();
        let span = tracing::info_span!("pending_order", reference = %params.reference);
        tokio::spawn(
            async move {
                match orders.record_pending(params).await {
                    Ok(_) => {}
                    Err(e) => error!(error = %e, "Failed to record pending order"),
                }
            }
            .instrument(span),
        );
    }

    /// Verifies and applies one webhook delivery.
    ///
    /// Nothing is written unless the signature matches the raw body.
    #[instrument(skip(self, body, signature_header))]
    pub async fn handle_webhook(
        &self,
        body: &[u8],
        signature_header: Option<&str>,
    ) -> Result<WebhookOutcome, PaymentError> {
        let signature_ok = signature_header
            .is_some_and(|header| signature::verify(&self.settings.secret_key, body, header));
        if !signature_ok {
            warn!("Webhook signature mismatch");
            return Err(PaymentError::InvalidSignature);
        }

        let event: WebhookEvent =
            serde_json::from_slice(body).map_err(|e| PaymentError::MalformedPayload(e.to_string()))?;
        if !event.is_success() {
            info!("Ignoring non-success event");
            return Ok(WebhookOutcome::Ignored);
        }
        let reference = event
            .reference()
            .ok_or_else(|| PaymentError::MalformedPayload("missing data.reference".to_string()))?
            .to_string();

        let params = event.to_order(&reference, self.settings.shipping_cost);
        match self.orders.confirm_payment(params).await? {
            ConfirmOutcome::Created(order) => {
                self.spawn_confirmation_email(&order);
                Ok(WebhookOutcome::Recorded {
                    reference,
                    promoted: false,
                })
            }
            ConfirmOutcome::Promoted(order) => {
                self.spawn_confirmation_email(&order);
                Ok(WebhookOutcome::Recorded {
                    reference,
                    promoted: true,
                })
            }
            ConfirmOutcome::AlreadyRecorded(status) => Ok(WebhookOutcome::Duplicate { reference, status }),
        }
    }

    fn spawn_confirmation_email(&self, order: &Order) {
        let email = match order_confirmation(order, &self.settings.app_url) {
            Ok(email) => email,
            Err(e) => {
                error!(reference = %order.reference, error = %e, "Confirmation email not rendered");
                return;
            }
        };
        let mailer = Arc::clone(&self.mailer);
        let span = tracing::info_span!("confirmation_email", reference = %order.reference);
        tokio::spawn(
            async move {
                if let Err(e) = mailer.send(email).await {
                    warn!(error = %e, "Confirmation email failed");
                }
            }
            .instrument(span),
        );
    }
}
