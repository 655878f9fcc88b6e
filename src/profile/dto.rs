use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo_types::{ActivityLevel, UserProfile, UserWithProfile};
use crate::error::FieldIssue;

pub const PROTEIN_G: (i32, i32) = (1, 600);
pub const CARBS_G: (i32, i32) = (1, 800);
pub const FAT_G: (i32, i32) = (1, 300);

/// Body of `PATCH /profile`. Absent fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub diets: Option<Vec<String>>,
    pub allergies: Option<Vec<String>>,
    pub workout_locations: Option<Vec<String>>,
    pub goals: Option<Vec<String>>,
    pub macro_velocity: Option<String>,
    pub activity_level: Option<String>,
    pub protein_g: Option<i32>,
    pub carbs_g: Option<i32>,
    pub fat_g: Option<i32>,
}

fn check_range(
    issues: &mut Vec<FieldIssue>,
    field: &str,
    value: Option<i32>,
    (lo, hi): (i32, i32),
) {
    if let Some(v) = value {
        if v < lo || v > hi {
            issues.push(FieldIssue::new(
                field,
                format!("must be between {lo} and {hi}"),
            ));
        }
    }
}

impl UpdateProfileRequest {
    /// Merge onto `current`, collecting every rejected field.
    pub fn apply_to(self, current: &UserProfile) -> Result<UserProfile, Vec<FieldIssue>> {
        let mut issues = Vec::new();
        check_range(&mut issues, "proteinG", self.protein_g, PROTEIN_G);
        check_range(&mut issues, "carbsG", self.carbs_g, CARBS_G);
        check_range(&mut issues, "fatG", self.fat_g, FAT_G);

        let activity_level = match self.activity_level.as_deref() {
            Some(raw) => match raw.parse::<ActivityLevel>() {
                Ok(level) => level,
                Err(_) => {
                    issues.push(FieldIssue::new("activityLevel", "unknown activity level"));
                    current.activity_level
                }
            },
            None => current.activity_level,
        };

        if !issues.is_empty() {
            return Err(issues);
        }

        let mut next = current.clone();
        if let Some(v) = self.diets {
            next.diets = v;
        }
        if let Some(v) = self.allergies {
            next.allergies = v;
        }
        if let Some(v) = self.workout_locations {
            next.workout_locations = v;
        }
        if let Some(v) = self.goals {
            next.goals = v;
        }
        if let Some(v) = self.macro_velocity {
            next.macro_velocity = v;
        }
        next.activity_level = activity_level;
        next.protein_g = self.protein_g.unwrap_or(next.protein_g);
        next.carbs_g = self.carbs_g.unwrap_or(next.carbs_g);
        next.fat_g = self.fat_g.unwrap_or(next.fat_g);
        Ok(next)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MacroTargetsView {
    pub protein_g: i32,
    pub carbs_g: i32,
    pub fat_g: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
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
    pub macro_targets: MacroTargetsView,
    pub daily_calories: i32,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub profile: ProfileView,
}

impl From<UserWithProfile> for ProfileResponse {
    fn from(user: UserWithProfile) -> Self {
        let p = user.profile;
        Self {
            id: user.id,
            email: user.email,
            profile: ProfileView {
                daily_calories: p.protein_g * 4 + p.carbs_g * 4 + p.fat_g * 9,
                macro_targets: MacroTargetsView {
                    protein_g: p.protein_g,
                    carbs_g: p.carbs_g,
                    fat_g: p.fat_g,
                },
                gender: p.gender,
                age_yrs: p.age_yrs,
                height_cm: p.height_cm,
                weight_kg: p.weight_kg,
                target_weight_kg: p.target_weight_kg,
                goals: p.goals,
                workout_locations: p.workout_locations,
                diets: p.diets,
                allergies: p.allergies,
                activity_level: p.activity_level,
                meals_per_day: p.meals_per_day,
                macro_velocity: p.macro_velocity,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::profile_fixture;

    #[test]
    fn empty_patch_keeps_everything() {
        let current = profile_fixture();
        let next = UpdateProfileRequest::default().apply_to(&current).unwrap();
        assert_eq!(next, current);
    }

    #[test]
    fn patch_replaces_lists_and_macros() {
        let current = profile_fixture();
        let req = UpdateProfileRequest {
            diets: Some(vec!["Keto".into()]),
            activity_level: Some("athlete".into()),
            protein_g: Some(180),
            ..Default::default()
        };
        let next = req.apply_to(&current).unwrap();
        assert_eq!(next.diets, vec!["Keto"]);
        assert_eq!(next.activity_level, ActivityLevel::Athlete);
        assert_eq!(next.protein_g, 180);
        assert_eq!(next.carbs_g, current.carbs_g);
    }

    #[test]
    fn out_of_range_and_unknown_level_are_reported_together() {
        let req = UpdateProfileRequest {
            activity_level: Some("couch potato".into()),
            fat_g: Some(0),
            carbs_g: Some(801),
            ..Default::default()
        };
        let issues = req.apply_to(&profile_fixture()).unwrap_err();
        let fields: Vec<_> = issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(fields, vec!["carbsG", "fatG", "activityLevel"]);
    }

    #[test]
    fn response_reports_daily_calories_from_macros() {
        let mut profile = profile_fixture();
        profile.protein_g = 150;
        profile.carbs_g = 200;
        profile.fat_g = 60;
        let res = ProfileResponse::from(UserWithProfile {
            id: Uuid::new_v4(),
            email: "a@b.co".into(),
            profile,
        });
        assert_eq!(res.profile.daily_calories, 150 * 4 + 200 * 4 + 60 * 9);
        let json = serde_json::to_value(&res).unwrap();
        assert_eq!(json["profile"]["macroTargets"]["proteinG"], 150);
        assert_eq!(json["profile"]["activityLevel"], "MODERATELY_ACTIVE");
    }
}
