//! Read-side projections over the per-day log rows.

use std::collections::{HashMap, HashSet};

use serde_json::Value;
use time::Date;

use super::dto::{
    DailyMeal, DailyMeals, ScheduledExercise, TodayExercise, TodayMeal, TodaySnapshot,
    WorkoutScheduleDay,
};
use super::repo_types::{ExerciseLog, MealLog, NewShoppingItem};
use crate::catalog::SimpleFood;
use crate::dates::{date_key, weekday_label};
use crate::json::{as_f64, string_array};

pub const DEFAULT_DURATION_MIN: i32 = 45;
pub const DEFAULT_INTENSITY: &str = "Moderate";
pub const DEFAULT_SETS: &str = "3 sets";
pub const DEFAULT_NOTES: &str = "Focus on form.";
pub const DEFAULT_CATEGORY: &str = "General";

fn strings(value: Option<&Value>) -> Vec<String> {
    value.map(string_array).unwrap_or_default()
}

/// Rows are expected to be already scoped to `today` and ordered by id.
pub fn today_snapshot(
    today: Date,
    meals: Vec<MealLog>,
    exercises: Vec<ExerciseLog>,
) -> TodaySnapshot {
    TodaySnapshot {
        date: date_key(today),
        meals: meals
            .into_iter()
            .map(|m| TodayMeal {
                id: m.id,
                meal_type: m.meal_type,
                name: m.name,
                calories: m.calories,
                protein_g: m.protein_g,
                carbs_g: m.carbs_g,
                fat_g: m.fat_g,
                eaten: m.eaten,
            })
            .collect(),
        exercises: exercises
            .into_iter()
            .map(|e| TodayExercise {
                id: e.id,
                weekday: e.weekday,
                name: e.name,
                sets: e.sets,
                notes: e.notes,
                completed: e.completed,
            })
            .collect(),
    }
}

/// Groups in first-seen order of the `YYYY-MM-DD` key.
pub fn group_daily_meals(rows: Vec<MealLog>) -> Vec<DailyMeals> {
    let mut days: Vec<DailyMeals> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for m in rows {
        let key = date_key(m.date);
        let meal = DailyMeal {
            id: m.id,
            meal_type: m.meal_type,
            name: m.name,
            recipe_id: m.recipe_id,
            calories: m.calories,
            protein_g: m.protein_g,
            carbs_g: m.carbs_g,
            fat_g: m.fat_g,
            ingredients: strings(m.ingredients.as_ref()),
            instructions: strings(m.instructions.as_ref()),
            eaten: m.eaten,
        };
        match index.get(&key) {
            Some(&i) => days[i].meals.push(meal),
            None => {
                index.insert(key.clone(), days.len());
                days.push(DailyMeals {
                    date: key,
                    meals: vec![meal],
                });
            }
        }
    }
    days
}

fn non_empty(value: Option<String>, fallback: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| fallback.to_owned())
}

/// Exercise rows grouped by stored weekday, or the date's label when the
/// weekday column is blank. Day-level fields come from the group's first row.
pub fn workout_schedule(rows: Vec<ExerciseLog>) -> Vec<WorkoutScheduleDay> {
    let mut groups: Vec<(String, Vec<ExerciseLog>)> = Vec::new();
    for row in rows {
        let key = if row.weekday.is_empty() {
            weekday_label(row.date).to_owned()
        } else {
            row.weekday.clone()
        };
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, entries)) => entries.push(row),
            None => groups.push((key, vec![row])),
        }
    }

    groups
        .into_iter()
        .map(|(weekday, entries)| {
            let first = &entries[0];
            let name = if first.name.contains("Rest") {
                "Rest / Recovery".to_owned()
            } else {
                format!("{weekday} Training")
            };
            let duration_min = first.duration_min.unwrap_or(DEFAULT_DURATION_MIN);
            let intensity = first
                .intensity
                .clone()
                .unwrap_or_else(|| DEFAULT_INTENSITY.to_owned());
            let exercises = entries
                .into_iter()
                .map(|e| ScheduledExercise {
                    id: e.id,
                    name: e.name,
                    sets: non_empty(e.sets, DEFAULT_SETS),
                    notes: non_empty(e.notes, DEFAULT_NOTES),
                    completed: e.completed,
                })
                .collect();
            WorkoutScheduleDay {
                weekday,
                name,
                duration_min,
                intensity,
                exercises,
            }
        })
        .collect()
}

/// What the upcoming meals point at: simple-food ids (unique, first-seen)
/// and the raw ingredient lines used when a food row is missing.
#[derive(Debug, Default, PartialEq)]
pub struct ShoppingRefs {
    pub food_ids: Vec<i32>,
    pub fallback_names: Vec<String>,
}

pub fn collect_shopping_refs(meals: &[MealLog]) -> ShoppingRefs {
    let mut refs = ShoppingRefs::default();
    let mut seen = HashSet::new();
    for meal in meals {
        if let Some(Value::Array(ids)) = &meal.simple_food_ids {
            for id in ids.iter().filter_map(as_f64) {
                if id.fract() == 0.0 && id.abs() <= f64::from(i32::MAX) && seen.insert(id as i32) {
                    refs.food_ids.push(id as i32);
                }
            }
        }
        refs.fallback_names
            .extend(strings(meal.ingredients.as_ref()));
    }
    refs
}

/// One item per distinct food name, counted in first-seen order. A fallback
/// line is added once, and only when its name is not already listed.
pub fn tally_shopping_items(
    foods: &[SimpleFood],
    fallback_names: &[String],
) -> Vec<NewShoppingItem> {
    let mut items: Vec<(String, u32, String)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for food in foods {
        match index.get(&food.name) {
            Some(&i) => items[i].1 += 1,
            None => {
                let category = if food.category.is_empty() {
                    DEFAULT_CATEGORY.to_owned()
                } else {
                    food.category.clone()
                };
                index.insert(food.name.clone(), items.len());
                items.push((food.name.clone(), 1, category));
            }
        }
    }
    for name in fallback_names {
        if !index.contains_key(name) {
            index.insert(name.clone(), items.len());
            items.push((name.clone(), 1, DEFAULT_CATEGORY.to_owned()));
        }
    }

    items
        .into_iter()
        .map(|(name, count, category)| NewShoppingItem {
            name,
            qty: format!("{count}x"),
            category,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::food_fixture;
    use serde_json::json;
    use time::macros::date;
    use uuid::Uuid;

    fn meal(id: i32, day: Date, foods: Value, ingredients: Value) -> MealLog {
        MealLog {
            id,
            user_id: Uuid::nil(),
            date: day,
            meal_type: "LUNCH".into(),
            name: format!("Meal {id}"),
            recipe_id: Some(7),
            simple_food_ids: Some(foods),
            calories: 500.0,
            protein_g: 38.0,
            carbs_g: 50.0,
            fat_g: 17.0,
            ingredients: Some(ingredients),
            instructions: Some(json!(["Cook", 3])),
            eaten: false,
        }
    }

    fn exercise(id: i32, day: Date, weekday: &str, name: &str) -> ExerciseLog {
        ExerciseLog {
            id,
            user_id: Uuid::nil(),
            date: day,
            weekday: weekday.into(),
            name: name.into(),
            exercise_id: Some(1),
            sets: None,
            notes: Some(String::new()),
            duration_min: None,
            intensity: None,
            completed: false,
        }
    }

    #[test]
    fn daily_meals_group_by_date_key() {
        let d1 = date!(2025 - 06 - 02);
        let d2 = date!(2025 - 06 - 03);
        let days = group_daily_meals(vec![
            meal(1, d1, json!([]), json!([])),
            meal(2, d1, json!([]), json!([])),
            meal(3, d2, json!([]), json!(["150g Oats"])),
        ]);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, "2025-06-02");
        assert_eq!(days[0].meals.iter().map(|m| m.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(days[1].meals[0].ingredients, vec!["150g Oats"]);
        assert_eq!(days[1].meals[0].instructions, vec!["Cook"]);
    }

    #[test]
    fn today_snapshot_uses_iso_date_and_type_key() {
        let today = date!(2025 - 06 - 02);
        let snap = today_snapshot(
            today,
            vec![meal(4, today, json!([]), json!([]))],
            vec![exercise(9, today, "Monday", "Squat")],
        );
        let body = serde_json::to_value(&snap).unwrap();
        assert_eq!(body["date"], "2025-06-02");
        assert_eq!(body["meals"][0]["type"], "LUNCH");
        assert_eq!(body["meals"][0]["proteinG"], 38.0);
        assert_eq!(body["exercises"][0]["weekday"], "Monday");
    }

    #[test]
    fn workout_schedule_applies_defaults() {
        let monday = date!(2025 - 06 - 02);
        let tuesday = date!(2025 - 06 - 03);
        let mut loaded = exercise(1, monday, "Monday", "Squat");
        loaded.duration_min = Some(60);
        loaded.intensity = Some("High".into());
        loaded.sets = Some("5x5".into());
        let days = workout_schedule(vec![
            loaded,
            exercise(2, monday, "Monday", "Row"),
            exercise(3, tuesday, "", "Rest day walk"),
        ]);

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].weekday, "Monday");
        assert_eq!(days[0].name, "Monday Training");
        assert_eq!(days[0].duration_min, 60);
        assert_eq!(days[0].intensity, "High");
        assert_eq!(days[0].exercises[0].sets, "5x5");
        assert_eq!(days[0].exercises[1].sets, DEFAULT_SETS);
        assert_eq!(days[0].exercises[1].notes, DEFAULT_NOTES);

        // blank weekday falls back to the calendar label
        assert_eq!(days[1].weekday, "Tuesday");
        assert_eq!(days[1].name, "Rest / Recovery");
        assert_eq!(days[1].duration_min, DEFAULT_DURATION_MIN);
        assert_eq!(days[1].intensity, DEFAULT_INTENSITY);
    }

    #[test]
    fn shopping_refs_dedupe_ids_and_keep_lines() {
        let day = date!(2025 - 06 - 02);
        let refs = collect_shopping_refs(&[
            meal(1, day, json!([3, 1, "2", 1.5]), json!(["100g Rice"])),
            meal(2, day, json!([1, 4]), json!(["100g Rice", 7])),
        ]);
        assert_eq!(refs.food_ids, vec![3, 1, 2, 4]);
        assert_eq!(refs.fallback_names, vec!["100g Rice", "100g Rice"]);
    }

    #[test]
    fn shopping_items_count_names_and_skip_covered_lines() {
        let mut oats = food_fixture(1, "Oats");
        oats.category = String::new();
        let foods = vec![oats, food_fixture(2, "Milk"), food_fixture(3, "Oats")];
        let lines = vec!["Milk".to_owned(), "100g Rice".to_owned(), "100g Rice".to_owned()];

        let items = tally_shopping_items(&foods, &lines);

        assert_eq!(
            items,
            vec![
                NewShoppingItem {
                    name: "Oats".into(),
                    qty: "2x".into(),
                    category: "General".into()
                },
                NewShoppingItem {
                    name: "Milk".into(),
                    qty: "1x".into(),
                    category: "Produce".into()
                },
                NewShoppingItem {
                    name: "100g Rice".into(),
                    qty: "1x".into(),
                    category: "General".into()
                },
            ]
        );
    }
}
