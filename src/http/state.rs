use std::fmt::Display;
use std::sync::Arc;

use axum::http::HeaderMap;
use tracing::warn;

use super::ApiError;
use crate::catalog::CatalogSource;
use crate::clients::{OrderClient, ProfileClient};
use crate::geo::Geocoder;
use crate::payments::{signature, PaymentService};

/// Shared handles for every request handler.
#[derive(Clone)]
pub struct AppState {
    pub payments: PaymentService,
    pub orders: OrderClient,
    pub profiles: ProfileClient,
    pub geocoder: Option<Arc<dyn Geocoder>>,
    pub catalog: Option<Arc<dyn CatalogSource>>,
    pub admin_token: Option<String>,
    /// Production hides provider error details from the logs.
    pub production: bool,
}

impl AppState {
    /// Logs a provider failure. Production leaves out the provider detail.
    pub fn log_upstream(&self, message: &str, detail: impl Display) {
        if self.production {
            warn!("{message}");
        } else {
            warn!(%detail, "{message}");
        }
    }

    /// Logs a provider failure and returns the generic message for the client.
    pub fn upstream_failure(&self, message: &str, detail: impl Display) -> ApiError {
        self.log_upstream(message, detail);
        ApiError::Upstream(message.to_string())
    }

    pub fn geocoder(&self) -> Result<&dyn Geocoder, ApiError> {
        self.geocoder
            .as_deref()
            .ok_or_else(|| ApiError::Unavailable("Address lookup unavailable".to_string()))
    }

    pub fn catalog(&self) -> Result<&dyn CatalogSource, ApiError> {
        self.catalog
            .as_deref()
            .ok_or_else(|| ApiError::Unavailable("Catalog unavailable".to_string()))
    }

    /// Admin routes need `Authorization: Bearer <token>`; without a configured
    /// token they are closed.
    pub fn require_admin(&self, headers: &HeaderMap) -> Result<(), ApiError> {
        check_admin_token(self.admin_token.as_deref(), headers)
    }
}

fn check_admin_token(expected: Option<&str>, headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(expected) = expected else {
        return Err(ApiError::Forbidden("Admin access is disabled".to_string()));
    };
    let presented = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim);
    match presented {
        Some(token) if signature::secrets_match(expected, token) => Ok(()),
        Some(_) => Err(ApiError::Forbidden("Invalid admin token".to_string())),
        None => Err(ApiError::Unauthorized("Admin token required".to_string())),
    }
}
