//! Message-driven profile updates.
//!
//! A chat message is scanned by a fixed, ordered list of independent
//! extractors. Every extractor that fires and yields a new in-bounds value
//! produces one [`ProfileChange`]; nothing is ever rejected loudly.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use super::repo_types::{ActivityLevel, UserProfile};
use crate::json::{json_number, string_array};

/// One inferred field mutation, kept in the plan's audit trail.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileChange {
    pub field: String,
    pub from: Value,
    pub to: Value,
}

impl ProfileChange {
    fn new(field: &str, from: Value, to: Value) -> Self {
        Self {
            field: field.to_owned(),
            from,
            to,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub profile: UserProfile,
    pub changes: Vec<ProfileChange>,
}

impl ProfileUpdate {
    pub fn is_changed(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Carry only the changed fields onto `current`, a fresher read of the
    /// same profile. Allergy edits are replayed as additions and removals.
    pub fn rebase(&self, current: &UserProfile) -> UserProfile {
        let mut next = current.clone();
        for change in &self.changes {
            match change.field.as_str() {
                "weightKg" => next.weight_kg = self.profile.weight_kg,
                "targetWeightKg" => next.target_weight_kg = self.profile.target_weight_kg,
                "heightCm" => next.height_cm = self.profile.height_cm,
                "ageYrs" => next.age_yrs = self.profile.age_yrs,
                "mealsPerDay" => next.meals_per_day = self.profile.meals_per_day,
                "activityLevel" => next.activity_level = self.profile.activity_level,
                "goals" => next.goals = self.profile.goals.clone(),
                "allergies" => {
                    let before = string_array(&change.from);
                    let after = string_array(&change.to);
                    let mut list: Vec<String> = std::mem::take(&mut next.allergies)
                        .into_iter()
                        .filter(|a| after.contains(a) || !before.contains(a))
                        .collect();
                    list.extend(after.into_iter().filter(|a| !before.contains(a)));
                    next.allergies = dedupe(list);
                }
                _ => {}
            }
        }
        next
    }
}

// Same bounds as registration.
pub const WEIGHT_KG: (f64, f64) = (25.0, 250.0);
pub const HEIGHT_CM: (f64, f64) = (120.0, 230.0);
pub const AGE_YRS: (i32, i32) = (15, 120);
pub const MEALS_PER_DAY: (i32, i32) = (1, 6);

lazy_static! {
    static ref WEIGHT_RE: Regex =
        Regex::new(r"(?i)(?:my\s+)?weight\s*(?:to|is|at)?\s*(\d+(?:\.\d+)?)").unwrap();
    static ref TARGET_WEIGHT_RE: Regex =
        Regex::new(r"(?i)target\s+weight\s*(?:to|is|at)?\s*(\d+(?:\.\d+)?)").unwrap();
    static ref HEIGHT_RE: Regex =
        Regex::new(r"(?i)height\s*(?:to|is|at)?\s*(\d+(?:\.\d+)?)").unwrap();
    static ref AGE_RE: Regex =
        Regex::new(r"(?i)(?:my\s+)?age\s*(?:to|is|at)?\s*(\d{1,3})").unwrap();
    static ref MEALS_RE: Regex = Regex::new(r"(?i)(\d)\s+meals?\s+(?:a|per)\s+day").unwrap();
    static ref ADD_ALLERGY_RE: Regex =
        Regex::new(r"(?i)(?:allergic to|add allergy)\s+([a-zA-Z\s]+)").unwrap();
    static ref REMOVE_ALLERGY_RE: Regex =
        Regex::new(r"(?i)(?:remove allergy|not allergic to)\s+([a-zA-Z\s]+)").unwrap();
}

fn capture_number(re: &Regex, message: &str) -> Option<f64> {
    re.captures(message)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|n| n.is_finite())
}

fn capture_text(re: &Regex, message: &str) -> Option<String> {
    let raw = re.captures(message)?.get(1)?.as_str();
    let text = raw.trim().trim_end_matches('.').to_owned();
    (!text.is_empty()).then_some(text)
}

fn in_range<T: PartialOrd>(value: T, (lo, hi): (T, T)) -> bool {
    value >= lo && value <= hi
}

/// More specific phrases are checked before looser ones.
pub fn parse_activity_level(lowered: &str) -> Option<ActivityLevel> {
    if lowered.contains("sedentary") {
        Some(ActivityLevel::Sedentary)
    } else if lowered.contains("lightly active") || lowered.contains("light active") {
        Some(ActivityLevel::LightlyActive)
    } else if lowered.contains("moderately active") || lowered.contains("moderate") {
        Some(ActivityLevel::ModeratelyActive)
    } else if lowered.contains("very active") {
        Some(ActivityLevel::VeryActive)
    } else if lowered.contains("athlete") {
        Some(ActivityLevel::Athlete)
    } else {
        None
    }
}

/// First keyword in check order wins when several goals are mentioned.
pub fn parse_goal(lowered: &str) -> Option<&'static str> {
    if lowered.contains("lose weight") || lowered.contains("fat loss") {
        Some("Lose Weight")
    } else if lowered.contains("build muscle") || lowered.contains("muscle") {
        Some("Build Muscle")
    } else if lowered.contains("maintain") {
        Some("Maintain")
    } else if lowered.contains("athletic") {
        Some("Athletic Performance")
    } else if lowered.contains("health") {
        Some("Improve Health")
    } else {
        None
    }
}

/// Trim, drop empties and keep the first occurrence of each value.
fn dedupe(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        let value = value.trim().to_owned();
        if !value.is_empty() && !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

fn string_list(values: &[String]) -> Value {
    Value::from(values.to_vec())
}

/// Apply every directive found in `message` to a copy of `current`.
pub fn apply_message(current: &UserProfile, message: &str) -> ProfileUpdate {
    let mut profile = current.clone();
    let mut changes = Vec::new();
    let lowered = message.to_lowercase();

    if let Some(weight) = capture_number(&WEIGHT_RE, message) {
        if in_range(weight, WEIGHT_KG) && profile.weight_kg != weight {
            changes.push(ProfileChange::new(
                "weightKg",
                json_number(profile.weight_kg),
                json_number(weight),
            ));
            profile.weight_kg = weight;
        }
    }

    if let Some(target) = capture_number(&TARGET_WEIGHT_RE, message) {
        if in_range(target, WEIGHT_KG) && profile.target_weight_kg != target {
            changes.push(ProfileChange::new(
                "targetWeightKg",
                json_number(profile.target_weight_kg),
                json_number(target),
            ));
            profile.target_weight_kg = target;
        }
    }

    if let Some(height) = capture_number(&HEIGHT_RE, message) {
        if in_range(height, HEIGHT_CM) && profile.height_cm != height {
            changes.push(ProfileChange::new(
                "heightCm",
                json_number(profile.height_cm),
                json_number(height),
            ));
            profile.height_cm = height;
        }
    }

    if let Some(age) = capture_number(&AGE_RE, message).map(|n| n as i32) {
        if in_range(age, AGE_YRS) && profile.age_yrs != age {
            changes.push(ProfileChange::new(
                "ageYrs",
                Value::from(profile.age_yrs),
                Value::from(age),
            ));
            profile.age_yrs = age;
        }
    }

    if let Some(meals) = capture_number(&MEALS_RE, message).map(|n| n as i32) {
        if in_range(meals, MEALS_PER_DAY) && profile.meals_per_day != meals {
            changes.push(ProfileChange::new(
                "mealsPerDay",
                Value::from(profile.meals_per_day),
                Value::from(meals),
            ));
            profile.meals_per_day = meals;
        }
    }

    if let Some(level) = parse_activity_level(&lowered) {
        if profile.activity_level != level {
            changes.push(ProfileChange::new(
                "activityLevel",
                Value::from(profile.activity_level.as_str()),
                Value::from(level.as_str()),
            ));
            profile.activity_level = level;
        }
    }

    // A recognised goal replaces the whole set.
    if let Some(goal) = parse_goal(&lowered) {
        if !profile.goals.iter().any(|g| g == goal) {
            let next = vec![goal.to_owned()];
            changes.push(ProfileChange::new(
                "goals",
                string_list(&profile.goals),
                string_list(&next),
            ));
            profile.goals = next;
        }
    }

    if let Some(allergy) = capture_text(&ADD_ALLERGY_RE, message) {
        if !profile.allergies.contains(&allergy) {
            let mut next = profile.allergies.clone();
            next.push(allergy);
            let next = dedupe(next);
            changes.push(ProfileChange::new(
                "allergies",
                string_list(&profile.allergies),
                string_list(&next),
            ));
            profile.allergies = next;
        }
    }

    if let Some(allergy) = capture_text(&REMOVE_ALLERGY_RE, message) {
        let wanted = allergy.to_lowercase();
        let next: Vec<String> = profile
            .allergies
            .iter()
            .filter(|a| a.to_lowercase() != wanted)
            .cloned()
            .collect();
        if next.len() != profile.allergies.len() {
            changes.push(ProfileChange::new(
                "allergies",
                string_list(&profile.allergies),
                string_list(&next),
            ));
            profile.allergies = next;
        }
    }

    ProfileUpdate { profile, changes }
}
