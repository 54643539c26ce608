use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::instrument;

use super::{ApiError, AppState};
use crate::cart::CartItem;
use crate::catalog::{CatalogError, Product, ProductSummary, Selection};
use crate::domain::Language;

#[derive(Debug, Default, Deserialize)]
pub struct LangQuery {
    #[serde(default)]
    pub lang: Language,
}

fn catalog_error(state: &AppState, error: CatalogError) -> ApiError {
    match error {
        e @ (CatalogError::UnknownVariant(_) | CatalogError::UnknownOption { .. }) => {
            ApiError::BadRequest(e.to_string())
        }
        e => state.upstream_failure("Catalog unavailable", e),
    }
}

async fn find_product(state: &AppState, slug: &str) -> Result<Product, ApiError> {
    state
        .catalog()?
        .product_by_slug(slug)
        .await
        .map_err(|e| catalog_error(state, e))?
        .ok_or_else(|| ApiError::NotFound(format!("Product not found: {slug}")))
}

#[instrument(skip_all)]
pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<ProductSummary>>, ApiError> {
    let products = state
        .catalog()?
        .list_products()
        .await
        .map_err(|e| catalog_error(&state, e))?;
    Ok(Json(products))
}

#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Product>, ApiError> {
    Ok(Json(find_product(&state, &slug).await?))
}

/// Prices a configuration and returns the cart line the client should add.
#[instrument(skip(state, payload))]
pub async fn configure_line_item(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<LangQuery>,
    payload: Result<Json<Selection>, JsonRejection>,
) -> Result<Json<CartItem>, ApiError> {
    let Json(selection) = payload?;
    let product = find_product(&state, &slug).await?;
    let item = product
        .configure(&selection, query.lang)
        .map_err(|e| catalog_error(&state, e))?;
    Ok(Json(item))
}
