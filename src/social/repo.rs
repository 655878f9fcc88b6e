use anyhow::Context;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{ConnectionRow, InviteCode};

const INVITE_COLUMNS: &str =
    "id, coach_id, code, expires_at, used_by_user_id, used_at, created_at";

pub async fn connections_for(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<ConnectionRow>> {
    sqlx::query_as::<_, ConnectionRow>(
        r#"
        SELECT c.id, c.user_id, c.connected_user_id, c.status, c.created_at,
               u.email AS connected_email
          FROM user_connections c
          JOIN users u ON u.id = c.connected_user_id
         WHERE c.user_id = $1
         ORDER BY c.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
    .context("list connections")
}

/// `None` when the pair is already connected.
pub async fn create_connection(
    db: &PgPool,
    user_id: Uuid,
    connected_user_id: Uuid,
    connected_email: &str,
) -> anyhow::Result<Option<ConnectionRow>> {
    sqlx::query_as::<_, ConnectionRow>(
        r#"
        INSERT INTO user_connections (user_id, connected_user_id)
        VALUES ($1, $2)
        ON CONFLICT (user_id, connected_user_id) DO NOTHING
        RETURNING id, user_id, connected_user_id, status, created_at, $3::text AS connected_email
        "#,
    )
    .bind(user_id)
    .bind(connected_user_id)
    .bind(connected_email)
    .fetch_optional(db)
    .await
    .context("insert connection")
}

pub async fn invites_for_coach(db: &PgPool, coach_id: Uuid) -> anyhow::Result<Vec<InviteCode>> {
    let sql = format!(
        "SELECT {INVITE_COLUMNS} FROM invite_codes WHERE coach_id = $1 ORDER BY expires_at DESC"
    );
    sqlx::query_as::<_, InviteCode>(&sql)
        .bind(coach_id)
        .fetch_all(db)
        .await
        .context("list invite codes")
}

/// `None` when the code is already taken.
pub async fn create_invite(
    db: &PgPool,
    coach_id: Uuid,
    code: &str,
    expires_at: OffsetDateTime,
) -> anyhow::Result<Option<InviteCode>> {
    let sql = format!(
        "INSERT INTO invite_codes (coach_id, code, expires_at) VALUES ($1, $2, $3) \
         ON CONFLICT (code) DO NOTHING RETURNING {INVITE_COLUMNS}"
    );
    sqlx::query_as::<_, InviteCode>(&sql)
        .bind(coach_id)
        .bind(code)
        .bind(expires_at)
        .fetch_optional(db)
        .await
        .context("insert invite code")
}

pub async fn find_invite(db: &PgPool, code: &str) -> anyhow::Result<Option<InviteCode>> {
    let sql = format!("SELECT {INVITE_COLUMNS} FROM invite_codes WHERE code = $1");
    sqlx::query_as::<_, InviteCode>(&sql)
        .bind(code)
        .fetch_optional(db)
        .await
        .context("find invite code")
}

/// Marks the code used. `None` when another redeem won the race or the code
/// expired in between.
pub async fn redeem_invite(
    db: &PgPool,
    invite_id: Uuid,
    user_id: Uuid,
) -> anyhow::Result<Option<InviteCode>> {
    let sql = format!(
        "UPDATE invite_codes SET used_by_user_id = $2, used_at = now() \
          WHERE id = $1 AND used_by_user_id IS NULL AND expires_at >= now() \
          RETURNING {INVITE_COLUMNS}"
    );
    sqlx::query_as::<_, InviteCode>(&sql)
        .bind(invite_id)
        .bind(user_id)
        .fetch_optional(db)
        .await
        .context("redeem invite code")
}
