use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::instrument;

use super::{ApiError, AppState};
use crate::geo::{AddressQuery, GeoError, GeocodedAddress, PlaceDetails};
use crate::validation::{validate_autocomplete_input, validate_place_id};

#[derive(Debug, Deserialize)]
pub struct AutocompleteRequest {
    #[serde(default)]
    pub input: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceDetailsRequest {
    #[serde(default)]
    pub place_id: String,
}

fn geo_error(state: &AppState, error: GeoError) -> ApiError {
    match error {
        GeoError::NotFound => ApiError::NotFound("No matching address".to_string()),
        e @ GeoError::Denied(_) => {
            state.log_upstream("Address lookup was denied", &e);
            ApiError::Forbidden("Address lookup was denied".to_string())
        }
        e => state.upstream_failure("Address lookup failed", e),
    }
}

#[instrument(skip_all)]
pub async fn autocomplete(
    State(state): State<AppState>,
    payload: Result<Json<AutocompleteRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload?;
    let geocoder = state.geocoder()?;
    let Some(input) = validate_autocomplete_input(&request.input)? else {
        return Ok(Json(json!({ "predictions": [] })));
    };
    let predictions = geocoder
        .autocomplete(&input)
        .await
        .map_err(|e| geo_error(&state, e))?;
    Ok(Json(json!({ "predictions": predictions })))
}

#[instrument(skip_all)]
pub async fn place_details(
    State(state): State<AppState>,
    payload: Result<Json<PlaceDetailsRequest>, JsonRejection>,
) -> Result<Json<PlaceDetails>, ApiError> {
    let Json(request) = payload?;
    let geocoder = state.geocoder()?;
    let place_id = validate_place_id(&request.place_id)?;
    let details = geocoder
        .place_details(&place_id)
        .await
        .map_err(|e| geo_error(&state, e))?;
    Ok(Json(details))
}

#[instrument(skip_all)]
pub async fn coordinates(
    State(state): State<AppState>,
    payload: Result<Json<AddressQuery>, JsonRejection>,
) -> Result<Json<GeocodedAddress>, ApiError> {
    let Json(query) = payload?;
    let geocoder = state.geocoder()?;
    let address = query
        .to_search_text()
        .ok_or_else(|| ApiError::BadRequest("Address required".to_string()))?;
    let found = geocoder
        .geocode(&address)
        .await
        .map_err(|e| geo_error(&state, e))?;
    Ok(Json(found))
}
