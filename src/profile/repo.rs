use anyhow::Context;
use serde_json::Value;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::repo_types::{ProfileRow, UserProfile, UserWithProfile};

const SELECT_PROFILE: &str = r#"
    SELECT u.id AS user_id, u.email, p.gender, p.age_yrs, p.height_cm, p.weight_kg,
           p.target_weight_kg, p.goals, p.workout_locations, p.diets, p.allergies,
           p.activity_level, p.meals_per_day, p.macro_velocity, p.protein_g, p.carbs_g, p.fat_g
      FROM users u
      JOIN user_profiles p ON p.user_id = u.id
     WHERE u.id = $1
"#;

/// Load a user together with their profile, `None` when either is missing.
pub async fn find_with_profile(
    db: &PgPool,
    user_id: Uuid,
) -> anyhow::Result<Option<UserWithProfile>> {
    let row = sqlx::query_as::<_, ProfileRow>(SELECT_PROFILE)
        .bind(user_id)
        .fetch_optional(db)
        .await
        .context("load profile")?;
    Ok(row.map(UserWithProfile::from))
}

/// Re-read the profile inside `tx` and hold its row lock until the end of
/// the transaction.
pub async fn lock_profile_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
) -> anyhow::Result<Option<UserProfile>> {
    let sql = format!("{SELECT_PROFILE} FOR UPDATE OF p");
    let row = sqlx::query_as::<_, ProfileRow>(&sql)
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await
        .context("lock profile")?;
    Ok(row.map(|r| UserWithProfile::from(r).profile))
}

fn list(values: &[String]) -> Value {
    Value::from(values.to_vec())
}

/// Insert the profile created at registration.
pub async fn insert_profile_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    p: &UserProfile,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO user_profiles (user_id, gender, age_yrs, height_cm, weight_kg, target_weight_kg,
                                   goals, workout_locations, diets, allergies, activity_level,
                                   meals_per_day, macro_velocity, protein_g, carbs_g, fat_g)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        "#,
    )
    .bind(user_id)
    .bind(&p.gender)
    .bind(p.age_yrs)
    .bind(p.height_cm)
    .bind(p.weight_kg)
    .bind(p.target_weight_kg)
    .bind(list(&p.goals))
    .bind(list(&p.workout_locations))
    .bind(list(&p.diets))
    .bind(list(&p.allergies))
    .bind(p.activity_level.as_str())
    .bind(p.meals_per_day)
    .bind(&p.macro_velocity)
    .bind(p.protein_g)
    .bind(p.carbs_g)
    .bind(p.fat_g)
    .execute(&mut **tx)
    .await
    .context("insert profile")?;
    Ok(())
}

/// Overwrite every mutable profile column.
pub async fn update_profile_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    p: &UserProfile,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        UPDATE user_profiles
           SET age_yrs = $2, height_cm = $3, weight_kg = $4, target_weight_kg = $5,
               goals = $6, workout_locations = $7, diets = $8, allergies = $9,
               activity_level = $10, meals_per_day = $11, macro_velocity = $12,
               protein_g = $13, carbs_g = $14, fat_g = $15, updated_at = now()
         WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .bind(p.age_yrs)
    .bind(p.height_cm)
    .bind(p.weight_kg)
    .bind(p.target_weight_kg)
    .bind(list(&p.goals))
    .bind(list(&p.workout_locations))
    .bind(list(&p.diets))
    .bind(list(&p.allergies))
    .bind(p.activity_level.as_str())
    .bind(p.meals_per_day)
    .bind(&p.macro_velocity)
    .bind(p.protein_g)
    .bind(p.carbs_g)
    .bind(p.fat_g)
    .execute(&mut **tx)
    .await
    .context("update profile")?;
    Ok(())
}

pub async fn update_profile(db: &PgPool, user_id: Uuid, p: &UserProfile) -> anyhow::Result<()> {
    let mut tx = db.begin().await.context("begin tx")?;
    update_profile_tx(&mut tx, user_id, p).await?;
    tx.commit().await.context("commit tx")?;
    Ok(())
}
