use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::FieldIssue;
use crate::profile::macros::{calculate_macro_targets, normalize_gender, MacroInput};
use crate::profile::{ActivityLevel, UserProfile};

pub const PASSWORD_MIN_CHARS: usize = 6;
pub const AGE_YRS: (i32, i32) = (15, 120);
pub const HEIGHT_CM: (f64, f64) = (120.0, 230.0);
pub const WEIGHT_KG: (f64, f64) = (25.0, 250.0);
pub const MEALS_PER_DAY: (i32, i32) = (1, 6);

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Request body for registration: credentials plus the initial profile.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub gender: String,
    pub age_yrs: i32,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub target_weight_kg: f64,
    pub goals: Vec<String>,
    pub workout_locations: Vec<String>,
    pub diets: Vec<String>,
    pub allergies: Vec<String>,
    pub activity_level: String,
    pub meals_per_day: i32,
}

fn out_of_range<T: PartialOrd + std::fmt::Display>(
    issues: &mut Vec<FieldIssue>,
    field: &str,
    value: T,
    (lo, hi): (T, T),
) {
    if value < lo || value > hi {
        issues.push(FieldIssue::new(field, format!("must be between {lo} and {hi}")));
    }
}

impl RegisterRequest {
    /// Checks every field and returns the parsed activity level.
    pub fn validate(&self) -> Result<ActivityLevel, Vec<FieldIssue>> {
        let mut issues = Vec::new();
        if !is_valid_email(&self.email) {
            issues.push(FieldIssue::new("email", "invalid email"));
        }
        if self.password.chars().count() < PASSWORD_MIN_CHARS {
            issues.push(FieldIssue::new(
                "password",
                format!("must be at least {PASSWORD_MIN_CHARS} characters"),
            ));
        }
        out_of_range(&mut issues, "ageYrs", self.age_yrs, AGE_YRS);
        out_of_range(&mut issues, "heightCm", self.height_cm, HEIGHT_CM);
        out_of_range(&mut issues, "weightKg", self.weight_kg, WEIGHT_KG);
        out_of_range(&mut issues, "targetWeightKg", self.target_weight_kg, WEIGHT_KG);
        out_of_range(&mut issues, "mealsPerDay", self.meals_per_day, MEALS_PER_DAY);
        for (field, list) in [
            ("goals", &self.goals),
            ("workoutLocations", &self.workout_locations),
            ("diets", &self.diets),
            ("allergies", &self.allergies),
        ] {
            if list.is_empty() {
                issues.push(FieldIssue::new(field, "must not be empty"));
            }
        }
        let level = self.activity_level.parse::<ActivityLevel>();
        if level.is_err() {
            issues.push(FieldIssue::new("activityLevel", "unknown activity level"));
        }

        match level {
            Ok(level) if issues.is_empty() => Ok(level),
            _ => Err(issues),
        }
    }

    /// The stored profile, with macro targets derived from the first goal.
    pub fn to_profile(&self, activity_level: ActivityLevel) -> UserProfile {
        let goal = self.goals.first().map(String::as_str).unwrap_or("Maintain");
        let macros = calculate_macro_targets(&MacroInput {
            gender: &self.gender,
            age_yrs: self.age_yrs,
            height_cm: self.height_cm,
            weight_kg: self.weight_kg,
            activity_level,
            goal,
        });
        UserProfile {
            gender: normalize_gender(&self.gender).to_owned(),
            age_yrs: self.age_yrs,
            height_cm: self.height_cm,
            weight_kg: self.weight_kg,
            target_weight_kg: self.target_weight_kg,
            goals: self.goals.clone(),
            workout_locations: self.workout_locations.clone(),
            diets: self.diets.clone(),
            allergies: self.allergies.clone(),
            activity_level,
            meals_per_day: self.meals_per_day,
            macro_velocity: "AI_RECOMMENDED".into(),
            protein_g: macros.protein_g,
            carbs_g: macros.carbs_g,
            fat_g: macros.fat_g,
        }
    }
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for token refresh.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Response returned after login, register or refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: PublicUser,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub is_pro: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn register_body() -> RegisterRequest {
        serde_json::from_value(json!({
            "email": "runner@example.com",
            "password": "secret1",
            "gender": "male",
            "ageYrs": 30,
            "heightCm": 180,
            "weightKg": 80,
            "targetWeightKg": 75,
            "goals": ["Maintain"],
            "workoutLocations": ["Home"],
            "diets": ["Balanced"],
            "allergies": ["None"],
            "activityLevel": "MODERATELY_ACTIVE",
            "mealsPerDay": 3
        }))
        .unwrap()
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("user@example.com"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("no at sign"));
    }

    #[test]
    fn valid_registration_builds_profile_with_macros() {
        let body = register_body();
        let level = body.validate().unwrap();
        let profile = body.to_profile(level);
        assert_eq!(profile.gender, "MALE");
        assert_eq!(profile.macro_velocity, "AI_RECOMMENDED");
        assert_eq!(profile.protein_g, 160);
        assert_eq!(profile.fat_g, 77);
        assert_eq!(profile.carbs_g, 357);
    }

    #[test]
    fn every_bad_field_is_reported() {
        let mut body = register_body();
        body.password = "abc".into();
        body.age_yrs = 12;
        body.height_cm = 300.0;
        body.diets.clear();
        body.activity_level = "couch".into();
        let issues = body.validate().unwrap_err();
        let fields: Vec<_> = issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["password", "ageYrs", "heightCm", "diets", "activityLevel"]
        );
    }

    #[test]
    fn public_user_serializes_without_secrets() {
        let json = serde_json::to_string(&PublicUser {
            id: Uuid::new_v4(),
            email: "test@example.com".to_string(),
            is_pro: true,
        })
        .unwrap();
        assert!(json.contains("test@example.com"));
        assert!(json.contains(r#""is_pro":true"#));
        assert!(!json.contains("password"));
    }
}
