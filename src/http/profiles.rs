use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::instrument;

use super::{ApiError, AppState};
use crate::domain::{Profile, ProfileCreate, ProfilePatch};

async fn load(state: &AppState, id: String) -> Result<Profile, ApiError> {
    state
        .profiles
        .get_profile(id.clone())
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Profile not found: {id}")))
}

#[instrument(skip_all)]
pub async fn create_profile(
    State(state): State<AppState>,
    payload: Result<Json<ProfileCreate>, JsonRejection>,
) -> Result<(StatusCode, Json<Profile>), ApiError> {
    let Json(params) = payload?;
    let id = state.profiles.create_profile(params).await?;
    Ok((StatusCode::CREATED, Json(load(&state, id).await?)))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Profile>, ApiError> {
    Ok(Json(load(&state, id).await?))
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ProfilePatch>, JsonRejection>,
) -> Result<Json<Profile>, ApiError> {
    let Json(patch) = payload?;
    Ok(Json(state.profiles.update_profile(id, patch).await?))
}
