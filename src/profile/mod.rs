use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod macros;
pub mod mutation;
pub mod repo;
pub mod repo_types;

pub use mutation::{apply_message, ProfileChange};
pub use repo_types::{ActivityLevel, UserProfile, UserWithProfile};

pub fn router() -> Router<AppState> {
    handlers::profile_routes()
}
