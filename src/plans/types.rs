use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::profile::ProfileChange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanKind {
    Diet,
    Workout,
}

impl PlanKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Diet => "diet",
            Self::Workout => "workout",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanAction {
    Create,
    Modify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Breakfast => "BREAKFAST",
            Self::Lunch => "LUNCH",
            Self::Dinner => "DINNER",
            Self::Snack => "SNACK",
        }
    }

    /// Loose label from the oracle to one of the four meal slots.
    pub fn from_label(raw: &str) -> Self {
        let lowered = raw.to_lowercase();
        if lowered.contains("break") {
            Self::Breakfast
        } else if lowered.contains("lunch") {
            Self::Lunch
        } else if lowered.contains("dinner") {
            Self::Dinner
        } else {
            Self::Snack
        }
    }
}

// ---- oracle output ----

#[derive(Debug, Clone, Deserialize)]
pub struct DietOraclePlan {
    pub action: PlanAction,
    pub summary: String,
    #[serde(default)]
    pub daily_calorie_target: Value,
    #[serde(default)]
    pub macro_guidance: String,
    pub weekly_plan: Vec<DietOracleDay>,
    #[serde(default)]
    pub cautions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DietOracleDay {
    #[serde(default)]
    pub weekday: String,
    #[serde(default)]
    pub meals: Vec<DietOracleMeal>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DietOracleMeal {
    #[serde(default)]
    pub meal_type: String,
    pub recipe_id: Option<i64>,
    #[serde(default)]
    pub simple_food_ids: Vec<i64>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkoutOraclePlan {
    pub action: PlanAction,
    pub summary: String,
    pub weekly_plan: Vec<WorkoutOracleDay>,
    #[serde(default)]
    pub recovery_notes: String,
    #[serde(default)]
    pub cautions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkoutOracleDay {
    #[serde(default)]
    pub weekday: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub duration_min: i32,
    #[serde(default)]
    pub intensity: String,
    #[serde(default)]
    pub exercises: Vec<WorkoutOracleExercise>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkoutOracleExercise {
    pub exercise_id: Option<i64>,
    #[serde(default)]
    pub sets: String,
    #[serde(default)]
    pub notes: String,
}

// ---- normalized ----

/// A meal whose recipe and foods all come from the offered candidates, with
/// nutrition derived from the recipe row.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedMeal {
    pub meal_type: MealType,
    pub recipe_id: i32,
    pub recipe_name: String,
    pub simple_food_ids: Vec<i32>,
    pub notes: String,
    pub calories: f64,
    pub protein_g: i32,
    pub carbs_g: i32,
    pub fat_g: i32,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DietDay {
    pub weekday: &'static str,
    pub meals: Vec<NormalizedMeal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedExercise {
    pub exercise_id: i32,
    pub name: String,
    pub sets: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutDay {
    pub weekday: &'static str,
    pub name: String,
    pub duration_min: i32,
    pub intensity: String,
    pub exercises: Vec<NormalizedExercise>,
}

// ---- stored plan JSON ----

#[derive(Debug, Clone, Serialize)]
pub struct StoredMeal {
    pub meal_type: MealType,
    pub recipe_id: i32,
    pub recipe_name: String,
    pub simple_food_ids: Vec<i32>,
    pub notes: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoredDietDay {
    pub weekday: &'static str,
    pub meals: Vec<StoredMeal>,
}

/// The oracle's plan with `weekly_plan` swapped for the normalized days.
#[derive(Debug, Clone, Serialize)]
pub struct StoredDietPlan {
    pub action: PlanAction,
    pub summary: String,
    pub daily_calorie_target: Value,
    pub macro_guidance: String,
    pub weekly_plan: Vec<StoredDietDay>,
    pub cautions: Vec<String>,
}

impl StoredDietPlan {
    pub fn new(raw: DietOraclePlan, days: &[DietDay]) -> Self {
        let weekly_plan = days
            .iter()
            .map(|day| StoredDietDay {
                weekday: day.weekday,
                meals: day
                    .meals
                    .iter()
                    .map(|m| StoredMeal {
                        meal_type: m.meal_type,
                        recipe_id: m.recipe_id,
                        recipe_name: m.recipe_name.clone(),
                        simple_food_ids: m.simple_food_ids.clone(),
                        notes: m.notes.clone(),
                    })
                    .collect(),
            })
            .collect();
        Self {
            action: raw.action,
            summary: raw.summary,
            daily_calorie_target: raw.daily_calorie_target,
            macro_guidance: raw.macro_guidance,
            weekly_plan,
            cautions: raw.cautions,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StoredWorkoutPlan {
    pub action: PlanAction,
    pub summary: String,
    pub weekly_plan: Vec<WorkoutDay>,
    pub recovery_notes: String,
    pub cautions: Vec<String>,
}

impl StoredWorkoutPlan {
    pub fn new(raw: WorkoutOraclePlan, days: Vec<WorkoutDay>) -> Self {
        Self {
            action: raw.action,
            summary: raw.summary,
            weekly_plan: days,
            recovery_notes: raw.recovery_notes,
            cautions: raw.cautions,
        }
    }
}

// ---- responses ----

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PlanReferences {
    Diet {
        #[serde(rename = "recipeIds")]
        recipe_ids: Vec<i32>,
        #[serde(rename = "simpleFoodIds")]
        simple_food_ids: Vec<i32>,
    },
    Workout {
        #[serde(rename = "exerciseIds")]
        exercise_ids: Vec<i32>,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResponse<P> {
    pub customer_id: Uuid,
    pub plan_type: PlanKind,
    pub mcp_changes: Vec<ProfileChange>,
    pub plan: P,
    pub references: PlanReferences,
}

// ---- stored rows ----

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PlanRecord {
    pub id: i32,
    pub user_id: Uuid,
    pub summary: String,
    pub plan_json: Value,
    pub source_message: String,
    pub mcp_changes: Option<Value>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ChatRecord {
    pub id: i32,
    pub user_id: Uuid,
    pub plan_type: String,
    pub user_message: String,
    pub ai_response_summary: String,
    pub mcp_changes: Option<Value>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Everything one generation call writes besides the log rows.
#[derive(Debug, Clone)]
pub struct NewPlan<'a> {
    pub kind: PlanKind,
    pub summary: &'a str,
    pub plan_json: Value,
    pub source_message: &'a str,
    pub changes: Value,
}
