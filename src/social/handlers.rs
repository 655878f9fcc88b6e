use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use rand::{rngs::StdRng, SeedableRng};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use crate::{
    auth::{repo_types::User, AuthUser},
    error::AppError,
    response::{data, Data},
    state::AppState,
};

use super::{
    dto::{ConnectionView, FriendRequest, RedeemRequest},
    repo,
    repo_types::InviteCode,
    services::{check_redeemable, friend_target, generate_invite_code, INVITE_TTL},
};

/// Fresh codes tried before giving up on a unique one.
const INVITE_CODE_ATTEMPTS: usize = 3;

type Created<T> = Result<(StatusCode, Json<Data<T>>), AppError>;

pub fn social_routes() -> Router<AppState> {
    Router::new()
        .route("/friends", get(list_friends))
        .route("/friends/request", post(request_friend))
        .route("/invites", get(list_invites))
        .route("/invites/generate", post(generate_invite))
        .route("/invites/redeem", post(redeem_invite))
}

#[instrument(skip(state))]
pub async fn list_friends(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Data<Vec<ConnectionView>>>, AppError> {
    let rows = repo::connections_for(&state.db, user_id).await?;
    Ok(data(rows.into_iter().map(ConnectionView::from).collect()))
}

#[instrument(skip(state, body))]
pub async fn request_friend(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<FriendRequest>,
) -> Created<ConnectionView> {
    let email = body.validated_email()?;
    let target = friend_target(user_id, User::find_by_email(&state.db, &email).await?)?;

    let row = repo::create_connection(&state.db, user_id, target.id, &target.email)
        .await?
        .ok_or_else(|| AppError::Conflict("Connection already exists".into()))?;
    info!(%user_id, connected_user_id = %target.id, "connection requested");
    Ok((StatusCode::CREATED, data(ConnectionView::from(row))))
}

#[instrument(skip(state))]
pub async fn list_invites(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Data<Vec<InviteCode>>>, AppError> {
    Ok(data(repo::invites_for_coach(&state.db, user_id).await?))
}

#[instrument(skip(state))]
pub async fn generate_invite(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Created<InviteCode> {
    let expires_at = OffsetDateTime::now_utc() + INVITE_TTL;
    let mut rng = StdRng::from_entropy();
    for _ in 0..INVITE_CODE_ATTEMPTS {
        let code = generate_invite_code(&mut rng);
        if let Some(invite) = repo::create_invite(&state.db, user_id, &code, expires_at).await? {
            info!(%user_id, code = %invite.code, "invite code generated");
            return Ok((StatusCode::CREATED, data(invite)));
        }
        warn!(%user_id, "invite code collision, retrying");
    }
    Err(anyhow::anyhow!("no unique invite code after {INVITE_CODE_ATTEMPTS} attempts").into())
}

#[instrument(skip(state, body))]
pub async fn redeem_invite(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<RedeemRequest>,
) -> Result<Json<Data<InviteCode>>, AppError> {
    let code = body.normalized_code()?;
    let invite = repo::find_invite(&state.db, &code)
        .await?
        .ok_or_else(|| AppError::NotFound("Invite code not found".into()))?;
    check_redeemable(&invite, OffsetDateTime::now_utc())?;

    let redeemed = repo::redeem_invite(&state.db, invite.id, user_id)
        .await?
        .ok_or_else(|| AppError::Conflict("Invite code already used".into()))?;
    info!(%user_id, coach_id = %redeemed.coach_id, "invite code redeemed");
    Ok(data(redeemed))
}
