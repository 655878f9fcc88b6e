use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::AppError,
    response::{data, Data},
    state::AppState,
};

use super::{
    dto::{ProfileResponse, UpdateProfileRequest},
    repo,
    repo_types::UserWithProfile,
};

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile).patch(patch_profile))
}

pub async fn load_user(state: &AppState, user_id: Uuid) -> Result<UserWithProfile, AppError> {
    repo::find_with_profile(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".into()))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Data<ProfileResponse>>, AppError> {
    let user = load_user(&state, user_id).await?;
    Ok(data(ProfileResponse::from(user)))
}

#[instrument(skip(state, payload))]
pub async fn patch_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<Data<ProfileResponse>>, AppError> {
    let mut user = load_user(&state, user_id).await?;
    let next = payload
        .apply_to(&user.profile)
        .map_err(AppError::invalid_fields)?;

    repo::update_profile(&state.db, user_id, &next).await?;
    info!(%user_id, "profile updated");

    user.profile = next;
    Ok(data(ProfileResponse::from(user)))
}
