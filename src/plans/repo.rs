use anyhow::Context;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, Postgres, Transaction};
use time::Date;
use uuid::Uuid;

use super::types::{ChatRecord, NewPlan, PlanKind, PlanRecord};
use crate::profile::{repo as profile_repo, UserProfile};
use crate::tracking::repo_types::{NewExerciseLog, NewMealLog};

/// Writes of one plan regeneration. Nothing is visible until `commit`; a
/// dropped or rolled back unit leaves the store untouched.
#[async_trait]
pub trait UnitOfWork: Send {
    async fn lock_profile(&mut self, user_id: Uuid) -> anyhow::Result<Option<UserProfile>>;
    async fn update_profile(&mut self, user_id: Uuid, profile: &UserProfile) -> anyhow::Result<()>;
    async fn insert_plan(&mut self, user_id: Uuid, plan: &NewPlan<'_>) -> anyhow::Result<i32>;
    async fn insert_chat_record(
        &mut self,
        user_id: Uuid,
        plan: &NewPlan<'_>,
    ) -> anyhow::Result<()>;
    async fn delete_meal_logs_from(&mut self, user_id: Uuid, from: Date) -> anyhow::Result<u64>;
    async fn insert_meal_log(&mut self, user_id: Uuid, row: &NewMealLog) -> anyhow::Result<()>;
    async fn delete_exercise_logs_from(
        &mut self,
        user_id: Uuid,
        from: Date,
    ) -> anyhow::Result<u64>;
    async fn insert_exercise_log(
        &mut self,
        user_id: Uuid,
        row: &NewExerciseLog,
    ) -> anyhow::Result<()>;
    async fn commit(self: Box<Self>) -> anyhow::Result<()>;
    async fn rollback(self: Box<Self>) -> anyhow::Result<()>;
}

#[async_trait]
pub trait PlanStore: Send + Sync {
    async fn latest_plan(
        &self,
        user_id: Uuid,
        kind: PlanKind,
    ) -> anyhow::Result<Option<PlanRecord>>;
    async fn recent_chat_records(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> anyhow::Result<Vec<ChatRecord>>;
    async fn begin(&self) -> anyhow::Result<Box<dyn UnitOfWork>>;
}

fn plan_table(kind: PlanKind) -> &'static str {
    match kind {
        PlanKind::Diet => "diet_plans",
        PlanKind::Workout => "workout_plans",
    }
}

#[derive(Clone)]
pub struct PgPlanStore {
    db: PgPool,
}

impl PgPlanStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PlanStore for PgPlanStore {
    async fn latest_plan(
        &self,
        user_id: Uuid,
        kind: PlanKind,
    ) -> anyhow::Result<Option<PlanRecord>> {
        let sql = format!(
            "SELECT id, user_id, summary, plan_json, source_message, mcp_changes, created_at \
               FROM {} WHERE user_id = $1 ORDER BY created_at DESC, id DESC LIMIT 1",
            plan_table(kind)
        );
        let row = sqlx::query_as::<_, PlanRecord>(&sql)
            .bind(user_id)
            .fetch_optional(&self.db)
            .await
            .context("latest plan")?;
        Ok(row)
    }

    async fn recent_chat_records(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> anyhow::Result<Vec<ChatRecord>> {
        let rows = sqlx::query_as::<_, ChatRecord>(
            r#"
            SELECT id, user_id, plan_type, user_message, ai_response_summary, mcp_changes,
                   created_at
              FROM ai_messages
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.db)
        .await
        .context("recent chat records")?;
        Ok(rows)
    }

    async fn begin(&self) -> anyhow::Result<Box<dyn UnitOfWork>> {
        let tx = self.db.begin().await.context("begin tx")?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }
}

pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

fn json_list<T: serde::Serialize>(items: &[T]) -> anyhow::Result<Value> {
    Ok(serde_json::to_value(items)?)
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn lock_profile(&mut self, user_id: Uuid) -> anyhow::Result<Option<UserProfile>> {
        profile_repo::lock_profile_tx(&mut self.tx, user_id).await
    }

    async fn update_profile(&mut self, user_id: Uuid, profile: &UserProfile) -> anyhow::Result<()> {
        profile_repo::update_profile_tx(&mut self.tx, user_id, profile).await
    }

    async fn insert_plan(&mut self, user_id: Uuid, plan: &NewPlan<'_>) -> anyhow::Result<i32> {
        let sql = format!(
            "INSERT INTO {} (user_id, summary, plan_json, source_message, mcp_changes) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
            plan_table(plan.kind)
        );
        let (id,): (i32,) = sqlx::query_as(&sql)
            .bind(user_id)
            .bind(plan.summary)
            .bind(&plan.plan_json)
            .bind(plan.source_message)
            .bind(&plan.changes)
            .fetch_one(&mut *self.tx)
            .await
            .context("insert plan")?;
        Ok(id)
    }

    async fn insert_chat_record(
        &mut self,
        user_id: Uuid,
        plan: &NewPlan<'_>,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO ai_messages (user_id, plan_type, user_message, ai_response_summary,
                                     mcp_changes)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user_id)
        .bind(plan.kind.as_str())
        .bind(plan.source_message)
        .bind(plan.summary)
        .bind(&plan.changes)
        .execute(&mut *self.tx)
        .await
        .context("insert chat record")?;
        Ok(())
    }

    async fn delete_meal_logs_from(&mut self, user_id: Uuid, from: Date) -> anyhow::Result<u64> {
        let res = sqlx::query("DELETE FROM meal_logs WHERE user_id = $1 AND date >= $2")
            .bind(user_id)
            .bind(from)
            .execute(&mut *self.tx)
            .await
            .context("delete future meal logs")?;
        Ok(res.rows_affected())
    }

    async fn insert_meal_log(&mut self, user_id: Uuid, row: &NewMealLog) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO meal_logs (user_id, date, meal_type, name, recipe_id, simple_food_ids,
                                   calories, protein_g, carbs_g, fat_g, ingredients,
                                   instructions, eaten)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, false)
            "#,
        )
        .bind(user_id)
        .bind(row.date)
        .bind(row.meal_type.as_str())
        .bind(&row.name)
        .bind(row.recipe_id)
        .bind(json_list(&row.simple_food_ids)?)
        .bind(row.calories)
        .bind(f64::from(row.protein_g))
        .bind(f64::from(row.carbs_g))
        .bind(f64::from(row.fat_g))
        .bind(json_list(&row.ingredients)?)
        .bind(json_list(&row.instructions)?)
        .execute(&mut *self.tx)
        .await
        .context("insert meal log")?;
        Ok(())
    }

    async fn delete_exercise_logs_from(
        &mut self,
        user_id: Uuid,
        from: Date,
    ) -> anyhow::Result<u64> {
        let res = sqlx::query("DELETE FROM exercise_logs WHERE user_id = $1 AND date >= $2")
            .bind(user_id)
            .bind(from)
            .execute(&mut *self.tx)
            .await
            .context("delete future exercise logs")?;
        Ok(res.rows_affected())
    }

    async fn insert_exercise_log(
        &mut self,
        user_id: Uuid,
        row: &NewExerciseLog,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO exercise_logs (user_id, date, weekday, name, exercise_id, sets, notes,
                                       duration_min, intensity, completed)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, false)
            "#,
        )
        .bind(user_id)
        .bind(row.date)
        .bind(&row.weekday)
        .bind(&row.name)
        .bind(row.exercise_id)
        .bind(&row.sets)
        .bind(&row.notes)
        .bind(row.duration_min)
        .bind(&row.intensity)
        .execute(&mut *self.tx)
        .await
        .context("insert exercise log")?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> anyhow::Result<()> {
        self.tx.commit().await.context("commit tx")
    }

    async fn rollback(self: Box<Self>) -> anyhow::Result<()> {
        self.tx.rollback().await.context("rollback tx")
    }
}
