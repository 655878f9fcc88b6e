use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use rand::{rngs::StdRng, SeedableRng};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::{AuthUser, ProUser},
    dates,
    error::AppError,
    profile::handlers::load_user,
    response::{data, Data},
    state::AppState,
};

use super::{
    dto::{ChatRequest, CustomerPlansResponse},
    services::{
        customer_plans, PlanGenerator, FRESH_MEAL_PLAN_MESSAGE, FRESH_WORKOUT_PLAN_MESSAGE,
    },
    types::{PlanResponse, StoredDietPlan, StoredWorkoutPlan},
};

type DietReply = Result<Json<Data<PlanResponse<StoredDietPlan>>>, AppError>;
type WorkoutReply = Result<Json<Data<PlanResponse<StoredWorkoutPlan>>>, AppError>;

pub fn plan_routes() -> Router<AppState> {
    Router::new()
        .route("/ai/diet/message", post(diet_message))
        .route("/ai/workout/message", post(workout_message))
        .route("/ai/generate-weekly-meal-plan", post(generate_weekly_meal_plan))
        .route("/ai/generate-workout-plan", post(generate_workout_plan))
        // reachable with and without the /ai prefix
        .route("/ai/customers/:customer_id/ai-plans", get(get_customer_plans))
        .route("/customers/:customer_id/ai-plans", get(get_customer_plans))
}

fn generator(state: &AppState) -> PlanGenerator<'_> {
    PlanGenerator::new(
        state.catalog.as_ref(),
        state.plans.as_ref(),
        state.oracle.as_ref(),
    )
}

async fn run_diet(state: &AppState, user_id: Uuid, message: &str) -> DietReply {
    let user = load_user(state, user_id).await?;
    let mut rng = StdRng::from_entropy();
    let plan = generator(state)
        .diet_from_message(&user, message, dates::today(), &mut rng)
        .await?;
    Ok(data(plan))
}

async fn run_workout(state: &AppState, user_id: Uuid, message: &str) -> WorkoutReply {
    let user = load_user(state, user_id).await?;
    let mut rng = StdRng::from_entropy();
    let plan = generator(state)
        .workout_from_message(&user, message, dates::today(), &mut rng)
        .await?;
    Ok(data(plan))
}

#[instrument(skip(state, body))]
pub async fn diet_message(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<ChatRequest>,
) -> DietReply {
    run_diet(&state, user_id, body.validated_message()?).await
}

#[instrument(skip(state, body))]
pub async fn workout_message(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<ChatRequest>,
) -> WorkoutReply {
    run_workout(&state, user_id, body.validated_message()?).await
}

#[instrument(skip(state))]
pub async fn generate_weekly_meal_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> DietReply {
    run_diet(&state, user_id, FRESH_MEAL_PLAN_MESSAGE).await
}

#[instrument(skip(state))]
pub async fn generate_workout_plan(
    State(state): State<AppState>,
    ProUser(user_id): ProUser,
) -> WorkoutReply {
    run_workout(&state, user_id, FRESH_WORKOUT_PLAN_MESSAGE).await
}

#[instrument(skip(state))]
pub async fn get_customer_plans(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(customer_id): Path<String>,
) -> Result<Json<Data<CustomerPlansResponse>>, AppError> {
    let plans = customer_plans(state.plans.as_ref(), user_id, &customer_id).await?;
    Ok(data(plans))
}
