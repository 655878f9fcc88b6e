use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::json::string_array;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityLevel {
    Sedentary,
    LightlyActive,
    ModeratelyActive,
    VeryActive,
    Athlete,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 5] = [
        Self::Sedentary,
        Self::LightlyActive,
        Self::ModeratelyActive,
        Self::VeryActive,
        Self::Athlete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sedentary => "SEDENTARY",
            Self::LightlyActive => "LIGHTLY_ACTIVE",
            Self::ModeratelyActive => "MODERATELY_ACTIVE",
            Self::VeryActive => "VERY_ACTIVE",
            Self::Athlete => "ATHLETE",
        }
    }

    /// TDEE multiplier applied to BMR.
    pub fn multiplier(self) -> f64 {
        match self {
            Self::Sedentary => 1.2,
            Self::LightlyActive => 1.375,
            Self::ModeratelyActive => 1.55,
            Self::VeryActive => 1.725,
            Self::Athlete => 1.9,
        }
    }
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == wanted)
            .ok_or_else(|| anyhow::anyhow!("unknown activity level: {s}"))
    }
}

/// Demographic and preference snapshot used to ground plan generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub gender: String,
    pub age_yrs: i32,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub target_weight_kg: f64,
    pub goals: Vec<String>,
    pub workout_locations: Vec<String>,
    pub diets: Vec<String>,
    pub allergies: Vec<String>,
    pub activity_level: ActivityLevel,
    pub meals_per_day: i32,
    pub macro_velocity: String,
    pub protein_g: i32,
    pub carbs_g: i32,
    pub fat_g: i32,
}

#[derive(Debug, Clone)]
pub struct UserWithProfile {
    pub id: Uuid,
    pub email: String,
    pub profile: UserProfile,
}

#[derive(Debug, FromRow)]
pub struct ProfileRow {
    pub user_id: Uuid,
    pub email: String,
    pub gender: String,
    pub age_yrs: i32,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub target_weight_kg: f64,
    pub goals: serde_json::Value,
    pub workout_locations: serde_json::Value,
    pub diets: serde_json::Value,
    pub allergies: serde_json::Value,
    pub activity_level: String,
    pub meals_per_day: i32,
    pub macro_velocity: String,
    pub protein_g: i32,
    pub carbs_g: i32,
    pub fat_g: i32,
}

impl From<ProfileRow> for UserWithProfile {
    fn from(r: ProfileRow) -> Self {
        let activity_level = r.activity_level.parse().unwrap_or_else(|e| {
            tracing::warn!(error = %e, user_id = %r.user_id, "stored activity level unreadable");
            ActivityLevel::ModeratelyActive
        });
        Self {
            id: r.user_id,
            email: r.email,
            profile: UserProfile {
                gender: r.gender,
                age_yrs: r.age_yrs,
                height_cm: r.height_cm,
                weight_kg: r.weight_kg,
                target_weight_kg: r.target_weight_kg,
                goals: string_array(&r.goals),
                workout_locations: string_array(&r.workout_locations),
                diets: string_array(&r.diets),
                allergies: string_array(&r.allergies),
                activity_level,
                meals_per_day: r.meals_per_day,
                macro_velocity: r.macro_velocity,
                protein_g: r.protein_g,
                carbs_g: r.carbs_g,
                fat_g: r.fat_g,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn activity_level_parses_case_insensitively() {
        assert_eq!(
            "very_active".parse::<ActivityLevel>().unwrap(),
            ActivityLevel::VeryActive
        );
        assert!("couch".parse::<ActivityLevel>().is_err());
    }

    #[test]
    fn row_with_bad_json_columns_yields_empty_lists() {
        let row = ProfileRow {
            user_id: Uuid::new_v4(),
            email: "a@b.co".into(),
            gender: "FEMALE".into(),
            age_yrs: 30,
            height_cm: 165.0,
            weight_kg: 60.0,
            target_weight_kg: 58.0,
            goals: json!("Lose Weight"),
            workout_locations: json!(null),
            diets: json!(["Vegan"]),
            allergies: json!([1, "nuts"]),
            activity_level: "nonsense".into(),
            meals_per_day: 3,
            macro_velocity: "AI_RECOMMENDED".into(),
            protein_g: 120,
            carbs_g: 180,
            fat_g: 50,
        };
        let user = UserWithProfile::from(row);
        assert!(user.profile.goals.is_empty());
        assert!(user.profile.workout_locations.is_empty());
        assert_eq!(user.profile.diets, vec!["Vegan"]);
        assert_eq!(user.profile.allergies, vec!["nuts"]);
        assert_eq!(user.profile.activity_level, ActivityLevel::ModeratelyActive);
    }
}
