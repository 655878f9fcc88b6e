use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use super::dto::LogBiometricRequest;
use super::repo_types::BiometricEntry;

const COLUMNS: &str = "id, user_id, weight_kg, body_fat_pct, waist_cm, chest_cm, recorded_at";

/// Newest first.
pub async fn entries_for(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<BiometricEntry>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM biometric_entries WHERE user_id = $1 ORDER BY recorded_at DESC"
    );
    sqlx::query_as::<_, BiometricEntry>(&sql)
        .bind(user_id)
        .fetch_all(db)
        .await
        .context("list biometric entries")
}

pub async fn insert_entry(
    db: &PgPool,
    user_id: Uuid,
    entry: &LogBiometricRequest,
) -> anyhow::Result<BiometricEntry> {
    let sql = format!(
        "INSERT INTO biometric_entries (user_id, weight_kg, body_fat_pct, waist_cm, chest_cm) \
         VALUES ($1, $2, $3, $4, $5) RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, BiometricEntry>(&sql)
        .bind(user_id)
        .bind(entry.weight_kg)
        .bind(entry.body_fat_pct)
        .bind(entry.waist_cm)
        .bind(entry.chest_cm)
        .fetch_one(db)
        .await
        .context("insert biometric entry")
}
