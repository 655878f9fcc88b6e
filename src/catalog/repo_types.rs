use serde::Serialize;
use sqlx::FromRow;

/// Rows that carry a stable integer id.
pub trait HasId {
    fn id(&self) -> i32;
}

#[derive(Debug, Clone, FromRow)]
pub struct Recipe {
    pub id: i32,
    pub plate_name: String,
    pub meal_type: String,
    pub goal_affinity: String,
    pub total_calories: f64,
    pub macro_ratio: Option<String>,
    pub difficulty: String,
    /// Either a structured `[{ingredient_id, amount_grams}]` list or the same
    /// list encoded as a JSON string.
    pub ingredients_list: Option<serde_json::Value>,
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SimpleFood {
    pub id: i32,
    pub name: String,
    pub category: String,
    pub calories: f64,
    pub proteins: f64,
    pub carbs: f64,
    pub fats: f64,
    pub fiber: f64,
    pub glycemic_index: String,
    pub is_allergen: bool,
}

#[derive(Debug, Clone, FromRow)]
pub struct Exercise {
    pub id: i32,
    pub name: String,
    pub category: String,
    pub goal: String,
    #[sqlx(rename = "type")]
    pub kind: String,
    pub muscle_group: String,
    pub equipment: String,
    pub difficulty: String,
}

impl HasId for Recipe {
    fn id(&self) -> i32 {
        self.id
    }
}

impl HasId for SimpleFood {
    fn id(&self) -> i32 {
        self.id
    }
}

impl HasId for Exercise {
    fn id(&self) -> i32 {
        self.id
    }
}
