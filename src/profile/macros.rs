use super::repo_types::ActivityLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacroTargets {
    pub protein_g: i32,
    pub carbs_g: i32,
    pub fat_g: i32,
    pub daily_calories: i32,
}

pub struct MacroInput<'a> {
    pub gender: &'a str,
    pub age_yrs: i32,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub activity_level: ActivityLevel,
    pub goal: &'a str,
}

pub fn normalize_gender(raw: &str) -> &'static str {
    if raw.eq_ignore_ascii_case("female") {
        "FEMALE"
    } else {
        "MALE"
    }
}

/// Mifflin-St Jeor BMR scaled by activity, shifted by goal.
pub fn calculate_macro_targets(input: &MacroInput<'_>) -> MacroTargets {
    let base = 10.0 * input.weight_kg + 6.25 * input.height_cm - 5.0 * f64::from(input.age_yrs);
    let bmr = if normalize_gender(input.gender) == "MALE" {
        base + 5.0
    } else {
        base - 161.0
    };
    let mut calories = bmr * input.activity_level.multiplier();

    let goal = input.goal.to_lowercase();
    if goal.contains("lose") || goal.contains("fat") {
        calories -= 350.0;
    }
    if goal.contains("build") || goal.contains("muscle") {
        calories += 250.0;
    }
    let calories = calories.round().max(1200.0);

    let protein = (input.weight_kg * 2.0).round();
    let fat = (calories * 0.25 / 9.0).round();
    let carbs = ((calories - protein * 4.0 - fat * 9.0) / 4.0).round();

    MacroTargets {
        protein_g: (protein as i32).max(60),
        carbs_g: (carbs as i32).max(80),
        fat_g: (fat as i32).max(30),
        daily_calories: calories as i32,
    }
}
