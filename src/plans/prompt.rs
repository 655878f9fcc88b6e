//! Prompt payloads and output schemas for the two plan domains.
//!
//! Candidates are trimmed to the handful of fields the model needs; full rows
//! never leave the process.

use serde::Serialize;
use serde_json::{json, Value};

use crate::catalog::{Exercise, Recipe, SimpleFood};
use crate::oracle::OracleRequest;
use crate::profile::{ActivityLevel, UserProfile};

pub const DIET_SCHEMA_NAME: &str = "diet_week_plan";
pub const WORKOUT_SCHEMA_NAME: &str = "workout_week_plan";

pub const DIET_SYSTEM_PROMPT: &str = "You are an AI nutrition coach.
Use only the provided recipe IDs and simple food IDs.
Do not invent IDs.
Create or modify a 7-day plan.
Keep meals actionable and safe.
Output strictly valid JSON matching the schema.";

pub const WORKOUT_SYSTEM_PROMPT: &str = "You are an AI fitness coach.
Use only provided exercise IDs.
Do not invent IDs.
Create or modify a 7-day workout protocol.
Keep instructions practical and safe.
Output strictly valid JSON matching the schema.";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DietProfileView<'a> {
    age_yrs: i32,
    height_cm: f64,
    weight_kg: f64,
    target_weight_kg: f64,
    activity_level: ActivityLevel,
    goals: &'a [String],
    diets: &'a [String],
    allergies: &'a [String],
    meals_per_day: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WorkoutProfileView<'a> {
    age_yrs: i32,
    height_cm: f64,
    weight_kg: f64,
    target_weight_kg: f64,
    activity_level: ActivityLevel,
    goals: &'a [String],
}

#[derive(Debug, Serialize)]
struct RecipeCandidate<'a> {
    id: i32,
    plate_name: &'a str,
    meal_type: &'a str,
    goal_affinity: &'a str,
    total_calories: f64,
    difficulty: &'a str,
}

#[derive(Debug, Serialize)]
struct FoodCandidate<'a> {
    id: i32,
    name: &'a str,
    category: &'a str,
    calories: f64,
    proteins: f64,
    carbs: f64,
    fats: f64,
    glycemic_index: &'a str,
    is_allergen: bool,
}

#[derive(Debug, Serialize)]
struct ExerciseCandidate<'a> {
    id: i32,
    name: &'a str,
    category: &'a str,
    goal: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    muscle_group: &'a str,
    equipment: &'a str,
    difficulty: &'a str,
}

#[derive(Debug, Serialize)]
struct DietPayload<'a> {
    task: &'static str,
    message: &'a str,
    #[serde(rename = "userProfile")]
    user_profile: DietProfileView<'a>,
    #[serde(rename = "latestPlan")]
    latest_plan: Option<&'a Value>,
    recipes: Vec<RecipeCandidate<'a>>,
    simple_foods: Vec<FoodCandidate<'a>>,
}

#[derive(Debug, Serialize)]
struct WorkoutPayload<'a> {
    task: &'static str,
    message: &'a str,
    #[serde(rename = "userProfile")]
    user_profile: WorkoutProfileView<'a>,
    #[serde(rename = "latestPlan")]
    latest_plan: Option<&'a Value>,
    exercises: Vec<ExerciseCandidate<'a>>,
}

pub fn diet_request(
    message: &str,
    profile: &UserProfile,
    latest_plan: Option<&Value>,
    recipes: &[Recipe],
    foods: &[SimpleFood],
) -> anyhow::Result<OracleRequest> {
    let payload = DietPayload {
        task: "Create or update 7-day diet plan",
        message,
        user_profile: DietProfileView {
            age_yrs: profile.age_yrs,
            height_cm: profile.height_cm,
            weight_kg: profile.weight_kg,
            target_weight_kg: profile.target_weight_kg,
            activity_level: profile.activity_level,
            goals: &profile.goals,
            diets: &profile.diets,
            allergies: &profile.allergies,
            meals_per_day: profile.meals_per_day,
        },
        latest_plan,
        recipes: recipes
            .iter()
            .map(|r| RecipeCandidate {
                id: r.id,
                plate_name: &r.plate_name,
                meal_type: &r.meal_type,
                goal_affinity: &r.goal_affinity,
                total_calories: r.total_calories,
                difficulty: &r.difficulty,
            })
            .collect(),
        simple_foods: foods
            .iter()
            .map(|f| FoodCandidate {
                id: f.id,
                name: &f.name,
                category: &f.category,
                calories: f.calories,
                proteins: f.proteins,
                carbs: f.carbs,
                fats: f.fats,
                glycemic_index: &f.glycemic_index,
                is_allergen: f.is_allergen,
            })
            .collect(),
    };
    Ok(OracleRequest {
        system_prompt: DIET_SYSTEM_PROMPT.to_owned(),
        user_prompt: serde_json::to_string_pretty(&payload)?,
        schema_name: DIET_SCHEMA_NAME,
        schema: diet_schema(),
    })
}

pub fn workout_request(
    message: &str,
    profile: &UserProfile,
    latest_plan: Option<&Value>,
    exercises: &[Exercise],
) -> anyhow::Result<OracleRequest> {
    let payload = WorkoutPayload {
        task: "Create or update 7-day workout plan",
        message,
        user_profile: WorkoutProfileView {
            age_yrs: profile.age_yrs,
            height_cm: profile.height_cm,
            weight_kg: profile.weight_kg,
            target_weight_kg: profile.target_weight_kg,
            activity_level: profile.activity_level,
            goals: &profile.goals,
        },
        latest_plan,
        exercises: exercises
            .iter()
            .map(|e| ExerciseCandidate {
                id: e.id,
                name: &e.name,
                category: &e.category,
                goal: &e.goal,
                kind: &e.kind,
                muscle_group: &e.muscle_group,
                equipment: &e.equipment,
                difficulty: &e.difficulty,
            })
            .collect(),
    };
    Ok(OracleRequest {
        system_prompt: WORKOUT_SYSTEM_PROMPT.to_owned(),
        user_prompt: serde_json::to_string_pretty(&payload)?,
        schema_name: WORKOUT_SCHEMA_NAME,
        schema: workout_schema(),
    })
}

pub fn diet_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "action": { "type": "string", "enum": ["create", "modify"] },
            "summary": { "type": "string" },
            "daily_calorie_target": { "type": "number" },
            "macro_guidance": { "type": "string" },
            "weekly_plan": {
                "type": "array",
                "minItems": 1,
                "maxItems": 7,
                "items": {
                    "type": "object",
                    "additionalProperties": false,
                    "properties": {
                        "weekday": { "type": "string" },
                        "meals": {
                            "type": "array",
                            "minItems": 1,
                            "items": {
                                "type": "object",
                                "additionalProperties": false,
                                "properties": {
                                    "meal_type": { "type": "string" },
                                    "recipe_id": { "type": "integer" },
                                    "simple_food_ids": {
                                        "type": "array",
                                        "items": { "type": "integer" }
                                    },
                                    "notes": { "type": "string" }
                                },
                                "required": ["meal_type", "recipe_id", "simple_food_ids", "notes"]
                            }
                        }
                    },
                    "required": ["weekday", "meals"]
                }
            },
            "cautions": { "type": "array", "items": { "type": "string" } }
        },
        "required": [
            "action",
            "summary",
            "daily_calorie_target",
            "macro_guidance",
            "weekly_plan",
            "cautions"
        ]
    })
}

pub fn workout_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "action": { "type": "string", "enum": ["create", "modify"] },
            "summary": { "type": "string" },
            "weekly_plan": {
                "type": "array",
                "minItems": 1,
                "maxItems": 7,
                "items": {
                    "type": "object",
                    "additionalProperties": false,
                    "properties": {
                        "weekday": { "type": "string" },
                        "name": { "type": "string" },
                        "duration_min": { "type": "integer" },
                        "intensity": { "type": "string" },
                        "exercises": {
                            "type": "array",
                            "minItems": 1,
                            "items": {
                                "type": "object",
                                "additionalProperties": false,
                                "properties": {
                                    "exercise_id": { "type": "integer" },
                                    "sets": { "type": "string" },
                                    "notes": { "type": "string" }
                                },
                                "required": ["exercise_id", "sets", "notes"]
                            }
                        }
                    },
                    "required": ["weekday", "name", "duration_min", "intensity", "exercises"]
                }
            },
            "recovery_notes": { "type": "string" },
            "cautions": { "type": "array", "items": { "type": "string" } }
        },
        "required": ["action", "summary", "weekly_plan", "recovery_notes", "cautions"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{exercise_fixture, food_fixture, profile_fixture, recipe_fixture};

    #[test]
    fn diet_payload_trims_candidates_and_carries_profile() {
        let profile = profile_fixture();
        let recipes = vec![recipe_fixture(7, 500.0, Some("30/40/30"), None)];
        let foods = vec![food_fixture(3, "Oats")];
        let latest = json!({"summary": "old"});
        let req = diet_request("hi", &profile, Some(&latest), &recipes, &foods).unwrap();

        assert_eq!(req.schema_name, DIET_SCHEMA_NAME);
        assert_eq!(req.system_prompt, DIET_SYSTEM_PROMPT);
        let payload: Value = serde_json::from_str(&req.user_prompt).unwrap();
        assert_eq!(payload["task"], "Create or update 7-day diet plan");
        assert_eq!(payload["userProfile"]["mealsPerDay"], profile.meals_per_day);
        assert_eq!(payload["latestPlan"]["summary"], "old");
        assert_eq!(payload["recipes"][0]["id"], 7);
        // instructions and ingredient lists are not offered
        assert!(payload["recipes"][0].get("instructions").is_none());
        assert_eq!(payload["simple_foods"][0]["name"], "Oats");
        assert!(payload["simple_foods"][0].get("fiber").is_none());
    }

    #[test]
    fn workout_payload_has_null_latest_plan_when_absent() {
        let profile = profile_fixture();
        let exercises = vec![exercise_fixture(4, "Squat")];
        let req = workout_request("go", &profile, None, &exercises).unwrap();
        let payload: Value = serde_json::from_str(&req.user_prompt).unwrap();
        assert!(payload["latestPlan"].is_null());
        assert_eq!(payload["exercises"][0]["type"], "strength");
        assert!(payload["userProfile"].get("diets").is_none());
        assert_eq!(req.schema["required"][2], "weekly_plan");
    }

    #[test]
    fn schemas_cap_the_week_at_seven_days() {
        assert_eq!(diet_schema()["properties"]["weekly_plan"]["maxItems"], 7);
        assert_eq!(workout_schema()["properties"]["weekly_plan"]["maxItems"], 7);
    }
}
