use rand::Rng;
use time::Date;
use tracing::{error, info, instrument};
use uuid::Uuid;

use super::dto::CustomerPlansResponse;
use super::normalize::{normalize_diet, normalize_workout, CandidateSet};
use super::persist::{exercise_rows, meal_rows, replace_forward_window, LogRows, PlanWrite};
use super::prompt::{diet_request, workout_request};
use super::repo::PlanStore;
use super::types::{
    DietDay, DietOraclePlan, NewPlan, PlanKind, PlanReferences, PlanResponse, StoredDietPlan,
    StoredWorkoutPlan, WorkoutDay, WorkoutOraclePlan,
};
use crate::catalog::{
    Catalog, EXERCISE_CANDIDATES, RECIPE_CANDIDATES, SIMPLE_FOOD_CANDIDATES,
};
use crate::error::AppError;
use crate::oracle::{generate_typed, GenerationError, JsonOracle};
use crate::profile::{apply_message, UserWithProfile};

pub const FRESH_MEAL_PLAN_MESSAGE: &str = "Create a fresh weekly meal plan based on my profile.";
pub const FRESH_WORKOUT_PLAN_MESSAGE: &str =
    "Create a fresh weekly workout plan based on my profile.";

/// The chat-driven plan pipeline: candidates, profile mutation, prompt,
/// oracle, normalization and the all-or-nothing write.
pub struct PlanGenerator<'a> {
    catalog: &'a dyn Catalog,
    store: &'a dyn PlanStore,
    oracle: &'a dyn JsonOracle,
}

/// Ids in first-seen order without repeats.
fn unique<I: IntoIterator<Item = i32>>(ids: I) -> Vec<i32> {
    let mut out = Vec::new();
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

fn diet_references(days: &[DietDay]) -> PlanReferences {
    let meals = || days.iter().flat_map(|d| d.meals.iter());
    PlanReferences::Diet {
        recipe_ids: unique(meals().map(|m| m.recipe_id)),
        simple_food_ids: unique(meals().flat_map(|m| m.simple_food_ids.iter().copied())),
    }
}

fn workout_references(days: &[WorkoutDay]) -> PlanReferences {
    PlanReferences::Workout {
        exercise_ids: unique(
            days.iter()
                .flat_map(|d| d.exercises.iter())
                .map(|e| e.exercise_id),
        ),
    }
}

fn log_generation_failure(kind: PlanKind, err: &GenerationError) {
    error!(plan_type = kind.as_str(), error = %err, "plan generation failed");
}

impl<'a> PlanGenerator<'a> {
    pub fn new(
        catalog: &'a dyn Catalog,
        store: &'a dyn PlanStore,
        oracle: &'a dyn JsonOracle,
    ) -> Self {
        Self {
            catalog,
            store,
            oracle,
        }
    }

    #[instrument(skip(self, user, rng), fields(user_id = %user.id))]
    pub async fn diet_from_message<R: Rng + Send>(
        &self,
        user: &UserWithProfile,
        message: &str,
        today: Date,
        rng: &mut R,
    ) -> Result<PlanResponse<StoredDietPlan>, AppError> {
        let recipes = self.catalog.recipes(RECIPE_CANDIDATES).await?;
        let foods = self.catalog.simple_foods(SIMPLE_FOOD_CANDIDATES).await?;
        if recipes.is_empty() {
            return Err(anyhow::anyhow!("no recipe candidates available").into());
        }
        info!(recipes = recipes.len(), foods = foods.len(), "diet candidates loaded");

        let latest = self.store.latest_plan(user.id, PlanKind::Diet).await?;
        let update = apply_message(&user.profile, message);
        info!(changes = update.changes.len(), "profile directives applied");

        let request = diet_request(
            message,
            &update.profile,
            latest.as_ref().map(|p| &p.plan_json),
            &recipes,
            &foods,
        )?;
        let raw: DietOraclePlan = generate_typed(self.oracle, &request)
            .await
            .map_err(|e| {
                log_generation_failure(PlanKind::Diet, &e);
                e
            })?;

        let days = normalize_diet(
            &raw,
            &CandidateSet::new(&recipes),
            &CandidateSet::new(&foods),
            update.profile.meals_per_day,
            rng,
        );
        let references = diet_references(&days);
        let rows = LogRows::Meals(meal_rows(&days, today));
        let plan = StoredDietPlan::new(raw, &days);

        {
            let write = PlanWrite {
                user_id: user.id,
                today,
                profile: update.is_changed().then_some(&update),
                plan: NewPlan {
                    kind: PlanKind::Diet,
                    summary: &plan.summary,
                    plan_json: serde_json::to_value(&plan).map_err(anyhow::Error::from)?,
                    source_message: message,
                    changes: serde_json::to_value(&update.changes).map_err(anyhow::Error::from)?,
                },
                rows,
            };
            replace_forward_window(self.store, &write).await?;
        }

        Ok(PlanResponse {
            customer_id: user.id,
            plan_type: PlanKind::Diet,
            mcp_changes: update.changes,
            plan,
            references,
        })
    }

    #[instrument(skip(self, user, rng), fields(user_id = %user.id))]
    pub async fn workout_from_message<R: Rng + Send>(
        &self,
        user: &UserWithProfile,
        message: &str,
        today: Date,
        rng: &mut R,
    ) -> Result<PlanResponse<StoredWorkoutPlan>, AppError> {
        let exercises = self.catalog.exercises(EXERCISE_CANDIDATES).await?;
        if exercises.is_empty() {
            return Err(anyhow::anyhow!("no exercise candidates available").into());
        }
        info!(exercises = exercises.len(), "workout candidates loaded");

        let latest = self.store.latest_plan(user.id, PlanKind::Workout).await?;
        let update = apply_message(&user.profile, message);
        info!(changes = update.changes.len(), "profile directives applied");

        let request = workout_request(
            message,
            &update.profile,
            latest.as_ref().map(|p| &p.plan_json),
            &exercises,
        )?;
        let raw: WorkoutOraclePlan = generate_typed(self.oracle, &request)
            .await
            .map_err(|e| {
                log_generation_failure(PlanKind::Workout, &e);
                e
            })?;

        let days = normalize_workout(&raw, &CandidateSet::new(&exercises), rng);
        let references = workout_references(&days);
        let rows = LogRows::Exercises(exercise_rows(&days, today));
        let plan = StoredWorkoutPlan::new(raw, days);

        {
            let write = PlanWrite {
                user_id: user.id,
                today,
                profile: update.is_changed().then_some(&update),
                plan: NewPlan {
                    kind: PlanKind::Workout,
                    summary: &plan.summary,
                    plan_json: serde_json::to_value(&plan).map_err(anyhow::Error::from)?,
                    source_message: message,
                    changes: serde_json::to_value(&update.changes).map_err(anyhow::Error::from)?,
                },
                rows,
            };
            replace_forward_window(self.store, &write).await?;
        }

        Ok(PlanResponse {
            customer_id: user.id,
            plan_type: PlanKind::Workout,
            mcp_changes: update.changes,
            plan,
            references,
        })
    }
}

pub const RECENT_MESSAGES_LIMIT: i64 = 20;

/// Latest plans and chat history, only ever for the caller themselves.
pub async fn customer_plans(
    store: &dyn PlanStore,
    caller: Uuid,
    customer_id: &str,
) -> Result<CustomerPlansResponse, AppError> {
    if customer_id != caller.to_string() {
        return Err(AppError::Forbidden("Forbidden".into()));
    }
    Ok(CustomerPlansResponse {
        customer_id: caller,
        latest_diet_plan: store.latest_plan(caller, PlanKind::Diet).await?,
        latest_workout_plan: store.latest_plan(caller, PlanKind::Workout).await?,
        recent_messages: store
            .recent_chat_records(caller, RECENT_MESSAGES_LIMIT)
            .await?,
    })
}
