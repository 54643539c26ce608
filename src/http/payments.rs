use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde_json::{json, Value};
use tracing::{info, instrument};

use super::{ApiError, AppState};
use crate::payments::{PaymentError, PaymentInitRequest, PaymentInitResponse, WebhookOutcome};

pub const SIGNATURE_HEADER: &str = "x-paystack-signature";

fn payment_error(state: &AppState, error: PaymentError) -> ApiError {
    match error {
        PaymentError::Validation(errors) => ApiError::Validation(errors),
        PaymentError::InvalidSignature => ApiError::Unauthorized("Invalid signature".to_string()),
        PaymentError::MalformedPayload(message) => ApiError::BadRequest(message),
        e @ (PaymentError::Http(_) | PaymentError::Provider { .. }) => {
            state.upstream_failure("Payment could not be started", e)
        }
        PaymentError::Order(e) => ApiError::Internal(e.to_string()),
        PaymentError::Profile(e) => ApiError::Internal(e.to_string()),
    }
}

#[instrument(skip_all)]
pub async fn init_payment(
    State(state): State<AppState>,
    payload: Result<Json<PaymentInitRequest>, JsonRejection>,
) -> Result<Json<PaymentInitResponse>, ApiError> {
    let Json(request) = payload?;
    let response = state
        .payments
        .initialize(request)
        .await
        .map_err(|e| payment_error(&state, e))?;
    Ok(Json(response))
}

/// Signature is checked against the raw bytes, so the body is not parsed here.
#[instrument(skip_all)]
pub async fn paystack_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    let outcome = state
        .payments
        .handle_webhook(&body, signature)
        .await
        .map_err(|e| payment_error(&state, e))?;

    let body = match outcome {
        WebhookOutcome::Ignored => json!({ "received": true }),
        WebhookOutcome::Recorded { reference, promoted } => {
            info!(%reference, promoted, "Webhook applied");
            json!({ "status": "ok" })
        }
        WebhookOutcome::Duplicate { reference, status } => {
            info!(%reference, %status, "Webhook duplicate");
            json!({ "status": "ok", "note": "order exists" })
        }
    };
    Ok(Json(body))
}
