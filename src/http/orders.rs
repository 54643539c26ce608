use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use tracing::{info, instrument};

use super::{ApiError, AppState};
use crate::clients::OrderFilter;
use crate::domain::{Order, OrderStatus};
use crate::validation::validate_tracking_number;

#[derive(Debug, Default, Deserialize)]
pub struct AdminOrderQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize)]
pub struct TrackingUpdate {
    pub tracking_number: String,
}

/// A buyer's own orders, newest first.
#[instrument(skip(state))]
pub async fn account_orders(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Order>>, ApiError> {
    if !state.profiles.profile_exists(&user_id).await? {
        return Err(ApiError::NotFound(format!("Profile not found: {user_id}")));
    }
    Ok(Json(state.orders.orders_for_user(user_id).await?))
}

#[instrument(skip(state, headers))]
pub async fn admin_list_orders(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<AdminOrderQuery>,
) -> Result<Json<Vec<Order>>, ApiError> {
    state.require_admin(&headers)?;
    let status = match query.status.as_deref().map(str::trim) {
        None | Some("") | Some("all") => None,
        Some(raw) => Some(raw.parse::<OrderStatus>().map_err(ApiError::BadRequest)?),
    };
    let orders = state
        .orders
        .search_orders(OrderFilter {
            status,
            query: query.q,
        })
        .await?;
    Ok(Json(orders))
}

#[instrument(skip(state, headers, payload))]
pub async fn admin_update_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(reference): Path<String>,
    payload: Result<Json<StatusUpdate>, JsonRejection>,
) -> Result<Json<Order>, ApiError> {
    state.require_admin(&headers)?;
    let Json(update) = payload?;
    let order = state.orders.update_status(reference, update.status).await?;
    info!(reference = %order.reference, status = %order.status, "Order status updated");
    Ok(Json(order))
}

#[instrument(skip(state, headers, payload))]
pub async fn admin_set_tracking(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(reference): Path<String>,
    payload: Result<Json<TrackingUpdate>, JsonRejection>,
) -> Result<Json<Order>, ApiError> {
    state.require_admin(&headers)?;
    let Json(update) = payload?;
    let tracking = validate_tracking_number(&update.tracking_number)?;
    let order = state.orders.set_tracking(reference, tracking).await?;
    info!(reference = %order.reference, "Tracking number assigned");
    Ok(Json(order))
}
