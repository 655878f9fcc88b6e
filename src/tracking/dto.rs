use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct UpdateEatenRequest {
    pub eaten: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCompletedRequest {
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TodayMeal {
    pub id: i32,
    #[serde(rename = "type")]
    pub meal_type: String,
    pub name: String,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub eaten: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TodayExercise {
    pub id: i32,
    pub weekday: String,
    pub name: String,
    pub sets: Option<String>,
    pub notes: Option<String>,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TodaySnapshot {
    pub date: String,
    pub meals: Vec<TodayMeal>,
    pub exercises: Vec<TodayExercise>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyMeal {
    pub id: i32,
    #[serde(rename = "type")]
    pub meal_type: String,
    pub name: String,
    pub recipe_id: Option<i32>,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub eaten: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyMeals {
    pub date: String,
    pub meals: Vec<DailyMeal>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScheduledExercise {
    pub id: i32,
    pub name: String,
    pub sets: String,
    pub notes: String,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutScheduleDay {
    pub weekday: String,
    pub name: String,
    pub duration_min: i32,
    pub intensity: String,
    pub exercises: Vec<ScheduledExercise>,
}
