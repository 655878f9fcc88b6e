use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::{info, instrument};

use crate::{
    auth::AuthUser,
    error::AppError,
    response::{data, Data},
    state::AppState,
};

use super::{dto::LogBiometricRequest, repo, repo_types::BiometricEntry};

pub fn biometric_routes() -> Router<AppState> {
    Router::new().route("/biometrics", get(list_entries).post(log_entry))
}

#[instrument(skip(state))]
pub async fn list_entries(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Data<Vec<BiometricEntry>>>, AppError> {
    Ok(data(repo::entries_for(&state.db, user_id).await?))
}

#[instrument(skip(state, body))]
pub async fn log_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<LogBiometricRequest>,
) -> Result<(StatusCode, Json<Data<BiometricEntry>>), AppError> {
    body.validate().map_err(AppError::invalid_fields)?;
    let entry = repo::insert_entry(&state.db, user_id, &body).await?;
    info!(%user_id, weight_kg = entry.weight_kg, "biometric entry logged");
    Ok((StatusCode::CREATED, data(entry)))
}
