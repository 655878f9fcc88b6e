use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    dates::{add_days, today},
    error::AppError,
    plans::types::{PlanKind, PlanRecord},
    response::{data, Data},
    state::AppState,
};

use super::{
    dto::{
        DailyMeals, TodaySnapshot, UpdateCompletedRequest, UpdateEatenRequest, WorkoutScheduleDay,
    },
    repo,
    repo_types::{ExerciseLog, MealLog, ShoppingItem},
    services::{
        collect_shopping_refs, group_daily_meals, tally_shopping_items, today_snapshot,
        workout_schedule,
    },
};

/// Shopping lists cover this many days starting today.
pub const SHOPPING_WINDOW_DAYS: i64 = 7;

pub fn tracking_routes() -> Router<AppState> {
    Router::new()
        .route("/ai/today", get(get_today))
        .route("/ai/weekly-meal-plan", get(get_weekly_meal_plan))
        .route("/ai/daily-meals", get(get_daily_meals))
        .route("/ai/workout-plan", get(get_workout_plan))
        .route("/ai/meals/:meal_id/eaten", put(put_meal_eaten))
        .route("/ai/exercises/:exercise_log_id/completed", put(put_exercise_completed))
        .route("/ai/generate-shopping-list", post(generate_shopping_list))
        .route("/ai/shopping-list", get(get_shopping_list))
}

#[instrument(skip(state))]
pub async fn get_today(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Data<TodaySnapshot>>, AppError> {
    let today = today();
    let tomorrow = add_days(today, 1);
    let meals = repo::meals_between(&state.db, user_id, today, tomorrow).await?;
    let exercises = repo::exercises_between(&state.db, user_id, today, tomorrow).await?;
    Ok(data(today_snapshot(today, meals, exercises)))
}

#[instrument(skip(state))]
pub async fn get_weekly_meal_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Data<Option<PlanRecord>>>, AppError> {
    let plan = state.plans.latest_plan(user_id, PlanKind::Diet).await?;
    Ok(data(plan))
}

#[instrument(skip(state))]
pub async fn get_daily_meals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Data<Vec<DailyMeals>>>, AppError> {
    let rows = repo::all_meals(&state.db, user_id).await?;
    Ok(data(group_daily_meals(rows)))
}

#[instrument(skip(state))]
pub async fn get_workout_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Data<Vec<WorkoutScheduleDay>>>, AppError> {
    let rows = repo::all_exercises(&state.db, user_id).await?;
    Ok(data(workout_schedule(rows)))
}

#[instrument(skip(state, body))]
pub async fn put_meal_eaten(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(meal_id): Path<i32>,
    Json(body): Json<UpdateEatenRequest>,
) -> Result<Json<Data<MealLog>>, AppError> {
    let meal = repo::set_meal_eaten(&state.db, user_id, meal_id, body.eaten)
        .await?
        .ok_or_else(|| AppError::NotFound("Meal not found".into()))?;
    Ok(data(meal))
}

#[instrument(skip(state, body))]
pub async fn put_exercise_completed(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(exercise_log_id): Path<i32>,
    Json(body): Json<UpdateCompletedRequest>,
) -> Result<Json<Data<ExerciseLog>>, AppError> {
    let log = repo::set_exercise_completed(&state.db, user_id, exercise_log_id, body.completed)
        .await?
        .ok_or_else(|| AppError::NotFound("Exercise log not found".into()))?;
    Ok(data(log))
}

async fn build_shopping_list(state: &AppState, user_id: Uuid) -> anyhow::Result<Vec<ShoppingItem>> {
    let start = today();
    let until = add_days(start, SHOPPING_WINDOW_DAYS);
    let meals = repo::meals_between(&state.db, user_id, start, until).await?;
    let refs = collect_shopping_refs(&meals);
    let foods = state.catalog.simple_foods_by_ids(&refs.food_ids).await?;
    let items = tally_shopping_items(&foods, &refs.fallback_names);
    let created = repo::replace_shopping_list(&state.db, user_id, &items).await?;
    info!(%user_id, meals = meals.len(), items = created.len(), "shopping list rebuilt");
    Ok(created)
}

#[instrument(skip(state))]
pub async fn generate_shopping_list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Data<Vec<ShoppingItem>>>, AppError> {
    let items = build_shopping_list(&state, user_id).await?;
    Ok(data(items))
}

#[instrument(skip(state))]
pub async fn get_shopping_list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Data<Vec<ShoppingItem>>>, AppError> {
    let items = repo::shopping_list(&state.db, user_id).await?;
    Ok(data(items))
}
