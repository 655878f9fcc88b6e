pub mod repo;
pub mod repo_types;

pub use repo::{Catalog, PgCatalog};
pub use repo_types::{Exercise, HasId, Recipe, SimpleFood};

/// How many rows of each kind are offered to the oracle per call.
pub const RECIPE_CANDIDATES: i64 = 100;
pub const SIMPLE_FOOD_CANDIDATES: i64 = 200;
pub const EXERCISE_CANDIDATES: i64 = 180;
