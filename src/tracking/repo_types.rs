use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;
use time::Date;
use uuid::Uuid;

use crate::dates::serialize_date;
use crate::plans::types::MealType;

/// One planned meal on a calendar date.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MealLog {
    pub id: i32,
    pub user_id: Uuid,
    #[serde(serialize_with = "serialize_date")]
    pub date: Date,
    pub meal_type: String,
    pub name: String,
    pub recipe_id: Option<i32>,
    pub simple_food_ids: Option<Value>,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub ingredients: Option<Value>,
    pub instructions: Option<Value>,
    pub eaten: bool,
}

/// One planned exercise on a calendar date.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseLog {
    pub id: i32,
    pub user_id: Uuid,
    #[serde(serialize_with = "serialize_date")]
    pub date: Date,
    pub weekday: String,
    pub name: String,
    pub exercise_id: Option<i32>,
    pub sets: Option<String>,
    pub notes: Option<String>,
    pub duration_min: Option<i32>,
    pub intensity: Option<String>,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewMealLog {
    pub date: Date,
    pub meal_type: MealType,
    pub name: String,
    pub recipe_id: i32,
    pub simple_food_ids: Vec<i32>,
    pub calories: f64,
    pub protein_g: i32,
    pub carbs_g: i32,
    pub fat_g: i32,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewExerciseLog {
    pub date: Date,
    pub weekday: String,
    pub name: String,
    pub exercise_id: i32,
    pub sets: String,
    pub notes: String,
    pub duration_min: i32,
    pub intensity: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ShoppingItem {
    pub id: i32,
    pub name: String,
    pub qty: String,
    pub category: String,
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShoppingItem {
    pub name: String,
    pub qty: String,
    pub category: String,
}
