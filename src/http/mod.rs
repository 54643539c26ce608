//! JSON HTTP surface.

mod catalog;
mod error;
mod geo;
mod orders;
mod payments;
mod profiles;
mod state;

pub use error::ApiError;
pub use payments::SIGNATURE_HEADER;
pub use state::AppState;

use axum::routing::{get, patch, post};
use axum::Router;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route("/api/paystack/init", post(payments::init_payment))
        .route("/api/paystack/webhook", post(payments::paystack_webhook))
        .route("/api/geo/autocomplete", post(geo::autocomplete))
        .route("/api/geo/place-details", post(geo::place_details))
        .route("/api/geo/coordinates", post(geo::coordinates))
        .route("/api/products", get(catalog::list_products))
        .route("/api/products/:slug", get(catalog::get_product))
        .route("/api/products/:slug/line-item", post(catalog::configure_line_item))
        .route("/api/account/:user_id/orders", get(orders::account_orders))
        .route("/api/admin/orders", get(orders::admin_list_orders))
        .route("/api/admin/orders/:reference/status", patch(orders::admin_update_status))
        .route("/api/admin/orders/:reference/tracking", patch(orders::admin_set_tracking))
        .route("/api/profiles", post(profiles::create_profile))
        .route("/api/profiles/:id", get(profiles::get_profile).patch(profiles::update_profile))
        .with_state(state)
}
