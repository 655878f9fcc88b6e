pub mod dto;
pub mod handlers;
pub mod normalize;
pub mod persist;
pub mod prompt;
pub mod repo;
pub mod services;
pub mod types;

pub use repo::{PgPlanStore, PlanStore};

use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    handlers::plan_routes()
}
