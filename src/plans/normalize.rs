//! Oracle output to storable plan days.
//!
//! Every id the oracle returns is checked against the exact candidate slice it
//! was shown. Unknown or missing ids are replaced by a uniformly random
//! candidate drawn from the injected RNG. Nutrition always comes from the
//! resolved recipe row, never from the oracle. Nothing in here fails: bad
//! fragments degrade to defaults.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::Value;
use tracing::debug;

use super::types::{
    DietDay, DietOracleMeal, DietOraclePlan, MealType, NormalizedExercise, NormalizedMeal,
    WorkoutDay, WorkoutOraclePlan,
};
use crate::catalog::{Exercise, HasId, Recipe, SimpleFood};
use crate::dates::WEEK_DAYS;
use crate::json::{as_f64, parse_json_or};

pub const MAX_DAYS: usize = 7;
pub const MIN_MEALS_PER_DAY: usize = 3;
pub const MAX_EXERCISES_PER_DAY: usize = 8;
pub const MAX_AUTO_FOODS: usize = 4;
pub const MAX_INSTRUCTION_STEPS: usize = 6;

/// Lookup over the rows offered to the oracle for one call.
pub struct CandidateSet<'a, T> {
    rows: &'a [T],
    by_id: HashMap<i32, &'a T>,
}

impl<'a, T: HasId> CandidateSet<'a, T> {
    pub fn new(rows: &'a [T]) -> Self {
        let mut by_id = HashMap::with_capacity(rows.len());
        for row in rows {
            by_id.entry(row.id()).or_insert(row);
        }
        Self { rows, by_id }
    }

    pub fn get(&self, id: i64) -> Option<&'a T> {
        i32::try_from(id).ok().and_then(|id| self.by_id.get(&id).copied())
    }

    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&'a T> {
        self.rows.choose(rng)
    }

    /// The requested row when it was offered, otherwise a random one.
    pub fn resolve<R: Rng + ?Sized>(&self, requested: Option<i64>, rng: &mut R) -> Option<&'a T> {
        match requested.and_then(|id| self.get(id)) {
            Some(row) => Some(row),
            None => {
                let picked = self.pick(rng);
                debug!(
                    ?requested,
                    substitute = ?picked.map(HasId::id),
                    "id not among candidates, substituted"
                );
                picked
            }
        }
    }
}

/// Case-insensitive match against the seven labels, else the positional day.
pub fn normalize_weekday(raw: &str, index: usize) -> &'static str {
    let wanted = raw.trim().to_lowercase();
    WEEK_DAYS
        .iter()
        .find(|day| day.to_lowercase() == wanted)
        .copied()
        .unwrap_or(WEEK_DAYS[index % WEEK_DAYS.len()])
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacroSplit {
    pub protein_pct: f64,
    pub carbs_pct: f64,
    pub fat_pct: f64,
}

impl MacroSplit {
    pub const FALLBACK: MacroSplit = MacroSplit {
        protein_pct: 30.0,
        carbs_pct: 40.0,
        fat_pct: 30.0,
    };
}

/// `"P/C/F"` percentages. Fewer than three numeric parts falls back to 30/40/30.
pub fn parse_macro_ratio(raw: Option<&str>) -> MacroSplit {
    let Some(raw) = raw else {
        return MacroSplit::FALLBACK;
    };
    let parts: Vec<f64> = raw
        .split('/')
        .filter_map(|part| {
            let part = part.trim();
            if part.is_empty() {
                Some(0.0)
            } else {
                part.parse::<f64>().ok().filter(|n| n.is_finite())
            }
        })
        .collect();
    match parts[..] {
        [protein_pct, carbs_pct, fat_pct, ..] => MacroSplit {
            protein_pct,
            carbs_pct,
            fat_pct,
        },
        _ => MacroSplit::FALLBACK,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacroGrams {
    pub protein_g: i32,
    pub carbs_g: i32,
    pub fat_g: i32,
}

/// 4 kcal per gram of protein and carbs, 9 per gram of fat.
pub fn macro_grams(calories: f64, split: MacroSplit) -> MacroGrams {
    MacroGrams {
        protein_g: (calories * split.protein_pct / 100.0 / 4.0).round() as i32,
        carbs_g: (calories * split.carbs_pct / 100.0 / 4.0).round() as i32,
        fat_g: (calories * split.fat_pct / 100.0 / 9.0).round() as i32,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecipeIngredient {
    pub ingredient_id: i64,
    pub amount_grams: f64,
}

fn ingredients_from_items(items: &[Value]) -> Vec<RecipeIngredient> {
    items
        .iter()
        .filter_map(|item| {
            let obj = item.as_object()?;
            let id = obj.get("ingredient_id").and_then(as_f64)?;
            let grams = obj.get("amount_grams").and_then(as_f64)?;
            (id.fract() == 0.0).then_some(RecipeIngredient {
                ingredient_id: id as i64,
                amount_grams: grams,
            })
        })
        .collect()
}

/// Structured list, or the same list JSON-encoded in a string (parsed once).
pub fn parse_recipe_ingredients(recipe: &Recipe) -> Vec<RecipeIngredient> {
    match &recipe.ingredients_list {
        Some(Value::Array(items)) => ingredients_from_items(items),
        Some(Value::String(raw)) => match parse_json_or(raw, Value::Null) {
            Value::Array(items) => ingredients_from_items(&items),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

pub fn instruction_steps(instructions: Option<&str>) -> Vec<String> {
    instructions
        .unwrap_or_default()
        .split('.')
        .map(str::trim)
        .filter(|step| !step.is_empty())
        .take(MAX_INSTRUCTION_STEPS)
        .map(str::to_owned)
        .collect()
}

fn ingredient_lines(
    ingredients: &[RecipeIngredient],
    foods: &CandidateSet<'_, SimpleFood>,
) -> Vec<String> {
    ingredients
        .iter()
        .filter_map(|item| {
            let food = foods.get(item.ingredient_id)?;
            Some(format!("{}g {}", item.amount_grams.round() as i64, food.name))
        })
        .collect()
}

/// Oracle-chosen ids are kept or substituted one by one. With none chosen the
/// first few recipe ingredients stand in, and those that do not resolve are
/// dropped.
fn resolve_food_ids<R: Rng + ?Sized>(
    chosen: &[i64],
    ingredients: &[RecipeIngredient],
    foods: &CandidateSet<'_, SimpleFood>,
    rng: &mut R,
) -> Vec<i32> {
    if chosen.is_empty() {
        return ingredients
            .iter()
            .take(MAX_AUTO_FOODS)
            .filter_map(|item| foods.get(item.ingredient_id))
            .map(|food| food.id)
            .collect();
    }
    chosen
        .iter()
        .filter_map(|&id| foods.resolve(Some(id), rng))
        .map(|food| food.id)
        .collect()
}

fn normalize_meal<R: Rng + ?Sized>(
    meal: &DietOracleMeal,
    recipes: &CandidateSet<'_, Recipe>,
    foods: &CandidateSet<'_, SimpleFood>,
    rng: &mut R,
) -> Option<NormalizedMeal> {
    let recipe = recipes.resolve(meal.recipe_id, rng)?;
    let ingredients = parse_recipe_ingredients(recipe);
    let simple_food_ids = resolve_food_ids(&meal.simple_food_ids, &ingredients, foods, rng);
    let calories = recipe.total_calories;
    let grams = macro_grams(calories, parse_macro_ratio(recipe.macro_ratio.as_deref()));

    Some(NormalizedMeal {
        meal_type: MealType::from_label(&meal.meal_type),
        recipe_id: recipe.id,
        recipe_name: recipe.plate_name.clone(),
        simple_food_ids,
        notes: meal.notes.clone(),
        calories,
        protein_g: grams.protein_g,
        carbs_g: grams.carbs_g,
        fat_g: grams.fat_g,
        ingredients: ingredient_lines(&ingredients, foods),
        instructions: instruction_steps(recipe.instructions.as_deref()),
    })
}

pub fn normalize_diet<R: Rng + ?Sized>(
    plan: &DietOraclePlan,
    recipes: &CandidateSet<'_, Recipe>,
    foods: &CandidateSet<'_, SimpleFood>,
    meals_per_day: i32,
    rng: &mut R,
) -> Vec<DietDay> {
    let meal_cap = usize::try_from(meals_per_day)
        .unwrap_or(0)
        .max(MIN_MEALS_PER_DAY);
    plan.weekly_plan
        .iter()
        .take(MAX_DAYS)
        .enumerate()
        .map(|(index, day)| DietDay {
            weekday: normalize_weekday(&day.weekday, index),
            meals: day
                .meals
                .iter()
                .take(meal_cap)
                .filter_map(|meal| normalize_meal(meal, recipes, foods, rng))
                .collect(),
        })
        .collect()
}

pub fn normalize_workout<R: Rng + ?Sized>(
    plan: &WorkoutOraclePlan,
    exercises: &CandidateSet<'_, Exercise>,
    rng: &mut R,
) -> Vec<WorkoutDay> {
    plan.weekly_plan
        .iter()
        .take(MAX_DAYS)
        .enumerate()
        .map(|(index, day)| WorkoutDay {
            weekday: normalize_weekday(&day.weekday, index),
            name: day.name.clone(),
            duration_min: day.duration_min,
            intensity: day.intensity.clone(),
            exercises: day
                .exercises
                .iter()
                .take(MAX_EXERCISES_PER_DAY)
                .filter_map(|item| {
                    let exercise = exercises.resolve(item.exercise_id, rng)?;
                    Some(NormalizedExercise {
                        exercise_id: exercise.id,
                        name: exercise.name.clone(),
                        sets: item.sets.clone(),
                        notes: item.notes.clone(),
                    })
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{exercise_fixture, food_fixture, recipe_fixture};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn diet_plan(days: Value) -> DietOraclePlan {
        serde_json::from_value(json!({
            "action": "create",
            "summary": "s",
            "daily_calorie_target": 2000,
            "macro_guidance": "",
            "weekly_plan": days,
            "cautions": []
        }))
        .unwrap()
    }

    fn workout_plan(days: Value) -> WorkoutOraclePlan {
        serde_json::from_value(json!({
            "action": "create",
            "summary": "s",
            "weekly_plan": days,
            "recovery_notes": "",
            "cautions": []
        }))
        .unwrap()
    }

    fn meal(recipe_id: i64, foods: &[i64]) -> Value {
        json!({"meal_type": "lunch", "recipe_id": recipe_id, "simple_food_ids": foods, "notes": ""})
    }

    fn recipes() -> Vec<Recipe> {
        vec![
            recipe_fixture(
                10,
                600.0,
                Some("30/40/30"),
                Some(json!([
                    {"ingredient_id": 1, "amount_grams": 120.4},
                    {"ingredient_id": 99, "amount_grams": 50},
                    {"ingredient_id": 2, "amount_grams": "30"},
                    {"ingredient_id": 3, "amount_grams": 10},
                    {"ingredient_id": 4, "amount_grams": 5}
                ])),
            ),
            recipe_fixture(11, 450.0, Some("25/50/25"), None),
            recipe_fixture(12, 520.0, None, Some(json!("not json ["))),
        ]
    }

    fn foods() -> Vec<SimpleFood> {
        vec![
            food_fixture(1, "Chicken"),
            food_fixture(2, "Rice"),
            food_fixture(3, "Broccoli"),
            food_fixture(4, "Olive oil"),
            food_fixture(5, "Egg"),
        ]
    }

    #[test]
    fn weekday_matches_case_insensitively_or_falls_back_to_position() {
        assert_eq!(normalize_weekday("  friday ", 0), "Friday");
        assert_eq!(normalize_weekday("Day 1", 0), "Monday");
        assert_eq!(normalize_weekday("", 8), "Tuesday");
    }

    #[test]
    fn macro_ratio_parsing() {
        assert_eq!(
            parse_macro_ratio(Some("25/50/25")),
            MacroSplit {
                protein_pct: 25.0,
                carbs_pct: 50.0,
                fat_pct: 25.0,
            }
        );
        assert_eq!(parse_macro_ratio(Some("40/60")), MacroSplit::FALLBACK);
        assert_eq!(parse_macro_ratio(Some("high protein")), MacroSplit::FALLBACK);
        assert_eq!(parse_macro_ratio(None), MacroSplit::FALLBACK);
    }

    #[test]
    fn macro_grams_add_back_up_to_the_calories() {
        for calories in [600.0, 450.0, 520.0] {
            let g = macro_grams(calories, MacroSplit::FALLBACK);
            let kcal = f64::from(g.protein_g * 4 + g.carbs_g * 4 + g.fat_g * 9);
            assert!((kcal - calories).abs() <= 3.0, "{calories} -> {kcal}");
        }
    }

    #[test]
    fn malformed_ingredient_string_parses_to_empty() {
        let recipe = recipe_fixture(1, 100.0, None, Some(json!("{oops")));
        assert!(parse_recipe_ingredients(&recipe).is_empty());
    }

    #[test]
    fn ingredient_string_is_parsed_once() {
        let encoded = json!([{"ingredient_id": 5, "amount_grams": 40}]).to_string();
        let recipe = recipe_fixture(1, 100.0, None, Some(Value::String(encoded)));
        assert_eq!(
            parse_recipe_ingredients(&recipe),
            vec![RecipeIngredient {
                ingredient_id: 5,
                amount_grams: 40.0,
            }]
        );
    }

    #[test]
    fn ingredient_entries_with_bad_fields_are_skipped() {
        let recipe = recipe_fixture(
            1,
            100.0,
            None,
            Some(json!([
                {"ingredient_id": 1.5, "amount_grams": 10},
                {"ingredient_id": 2},
                "x",
                {"ingredient_id": "3", "amount_grams": 7}
            ])),
        );
        assert_eq!(
            parse_recipe_ingredients(&recipe),
            vec![RecipeIngredient {
                ingredient_id: 3,
                amount_grams: 7.0,
            }]
        );
    }

    #[test]
    fn instructions_split_on_periods_and_cap_at_six() {
        let steps = instruction_steps(Some("Boil. Stir.  . Add salt. Serve. Eat. Rest. Wash."));
        assert_eq!(steps, vec!["Boil", "Stir", "Add salt", "Serve", "Eat", "Rest"]);
        assert!(instruction_steps(None).is_empty());
    }

    #[test]
    fn nine_days_become_the_first_seven() {
        let recipes = recipes();
        let foods = foods();
        let days: Vec<Value> = (0..9)
            .map(|i| json!({"weekday": format!("day {i}"), "meals": [meal(10, &[1])]}))
            .collect();
        let plan = diet_plan(Value::Array(days));
        let mut rng = StdRng::seed_from_u64(1);
        let out = normalize_diet(
            &plan,
            &CandidateSet::new(&recipes),
            &CandidateSet::new(&foods),
            3,
            &mut rng,
        );
        assert_eq!(out.len(), 7);
        let labels: Vec<_> = out.iter().map(|d| d.weekday).collect();
        assert_eq!(labels, WEEK_DAYS.to_vec());
    }

    #[test]
    fn duplicate_weekdays_are_kept() {
        let recipes = recipes();
        let foods = foods();
        let plan = diet_plan(json!([
            {"weekday": "monday", "meals": [meal(10, &[1])]},
            {"weekday": "Monday", "meals": [meal(11, &[2])]}
        ]));
        let mut rng = StdRng::seed_from_u64(1);
        let out = normalize_diet(
            &plan,
            &CandidateSet::new(&recipes),
            &CandidateSet::new(&foods),
            3,
            &mut rng,
        );
        assert_eq!(out[0].weekday, "Monday");
        assert_eq!(out[1].weekday, "Monday");
    }

    #[test]
    fn unknown_recipe_is_replaced_and_macros_follow_the_substitute() {
        let recipes = recipes();
        let foods = foods();
        let plan = diet_plan(json!([{"weekday": "Monday", "meals": [meal(4242, &[1])]}]));
        let mut rng = StdRng::seed_from_u64(7);
        let out = normalize_diet(
            &plan,
            &CandidateSet::new(&recipes),
            &CandidateSet::new(&foods),
            3,
            &mut rng,
        );
        let m = &out[0].meals[0];
        assert_ne!(m.recipe_id, 4242);
        let chosen = recipes.iter().find(|r| r.id == m.recipe_id).unwrap();
        assert_eq!(m.calories, chosen.total_calories);
        assert_eq!(m.recipe_name, chosen.plate_name);
        let expected = macro_grams(
            chosen.total_calories,
            parse_macro_ratio(chosen.macro_ratio.as_deref()),
        );
        assert_eq!(
            (m.protein_g, m.carbs_g, m.fat_g),
            (expected.protein_g, expected.carbs_g, expected.fat_g)
        );
    }

    #[test]
    fn same_seed_same_substitutions() {
        let recipes = recipes();
        let foods = foods();
        let plan = diet_plan(json!([
            {"weekday": "Monday", "meals": [meal(-1, &[900, 901]), meal(0, &[])]}
        ]));
        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            normalize_diet(
                &plan,
                &CandidateSet::new(&recipes),
                &CandidateSet::new(&foods),
                3,
                &mut rng,
            )
        };
        assert_eq!(run(42), run(42));
    }

    #[test]
    fn every_referenced_id_is_a_candidate() {
        let recipes = recipes();
        let foods = foods();
        let plan = diet_plan(json!([
            {
                "weekday": "Monday",
                "meals": [meal(77, &[1, 500, 2]), meal(10, &[]), meal(12, &[-3])]
            },
            {"weekday": "Tuesday", "meals": [{"meal_type": "snack"}]}
        ]));
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let out = normalize_diet(
                &plan,
                &CandidateSet::new(&recipes),
                &CandidateSet::new(&foods),
                3,
                &mut rng,
            );
            for m in out.iter().flat_map(|d| &d.meals) {
                assert!(recipes.iter().any(|r| r.id == m.recipe_id));
                for id in &m.simple_food_ids {
                    assert!(foods.iter().any(|f| f.id == *id));
                }
            }
            // substituted foods keep their slot
            assert_eq!(out[0].meals[0].simple_food_ids.len(), 3);
        }
    }

    #[test]
    fn auto_derived_foods_take_the_first_four_that_resolve() {
        let recipes = recipes();
        let foods = foods();
        let plan = diet_plan(json!([{"weekday": "Monday", "meals": [meal(10, &[])]}]));
        let mut rng = StdRng::seed_from_u64(3);
        let out = normalize_diet(
            &plan,
            &CandidateSet::new(&recipes),
            &CandidateSet::new(&foods),
            3,
            &mut rng,
        );
        let m = &out[0].meals[0];
        // first four ingredients are 1, 99, 2, 3; 99 is not a candidate
        assert_eq!(m.simple_food_ids, vec![1, 2, 3]);
        assert_eq!(
            m.ingredients,
            vec!["120g Chicken", "30g Rice", "10g Broccoli", "5g Olive oil"]
        );
        assert_eq!(m.meal_type, MealType::Lunch);
    }

    #[test]
    fn meals_are_capped_at_max_of_profile_and_three() {
        let recipes = recipes();
        let foods = foods();
        let meals: Vec<Value> = (0..8).map(|_| meal(11, &[1])).collect();
        let plan = diet_plan(json!([{"weekday": "Monday", "meals": meals}]));
        let mut rng = StdRng::seed_from_u64(0);
        let recipe_set = CandidateSet::new(&recipes);
        let food_set = CandidateSet::new(&foods);
        assert_eq!(normalize_diet(&plan, &recipe_set, &food_set, 1, &mut rng)[0].meals.len(), 3);
        assert_eq!(normalize_diet(&plan, &recipe_set, &food_set, 5, &mut rng)[0].meals.len(), 5);
    }

    #[test]
    fn workout_exercises_are_resolved_and_capped() {
        let exercises = vec![exercise_fixture(1, "Squat"), exercise_fixture(2, "Row")];
        let items: Vec<Value> = (0..10)
            .map(|i| {
                let id = if i == 0 { 999 } else { 2 };
                json!({"exercise_id": id, "sets": "3x10", "notes": "n"})
            })
            .collect();
        let plan = workout_plan(json!([
            {
                "weekday": "wednesday",
                "name": "Pull",
                "duration_min": 50,
                "intensity": "High",
                "exercises": items
            }
        ]));
        let mut rng = StdRng::seed_from_u64(9);
        let out = normalize_workout(&plan, &CandidateSet::new(&exercises), &mut rng);
        assert_eq!(out[0].weekday, "Wednesday");
        assert_eq!(out[0].exercises.len(), MAX_EXERCISES_PER_DAY);
        assert!([1, 2].contains(&out[0].exercises[0].exercise_id));
        assert_eq!(out[0].exercises[1].name, "Row");
        assert_eq!(out[0].duration_min, 50);
    }

    #[test]
    fn empty_candidates_drop_entries_instead_of_panicking() {
        let none: Vec<Exercise> = Vec::new();
        let plan = workout_plan(json!([
            {
                "weekday": "Monday",
                "name": "x",
                "duration_min": 1,
                "intensity": "",
                "exercises": [{"exercise_id": 1, "sets": "", "notes": ""}]
            }
        ]));
        let mut rng = StdRng::seed_from_u64(0);
        let out = normalize_workout(&plan, &CandidateSet::new(&none), &mut rng);
        assert!(out[0].exercises.is_empty());
    }
}
