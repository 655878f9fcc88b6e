use anyhow::Context;
use sqlx::PgPool;
use time::Date;
use uuid::Uuid;

use super::repo_types::{ExerciseLog, MealLog, NewShoppingItem, ShoppingItem};

const MEAL_COLUMNS: &str = "id, user_id, date, meal_type, name, recipe_id, simple_food_ids, \
     calories, protein_g, carbs_g, fat_g, ingredients, instructions, eaten";

const EXERCISE_COLUMNS: &str = "id, user_id, date, weekday, name, exercise_id, sets, notes, \
     duration_min, intensity, completed";

/// Meal rows with `from <= date < until`, ordered by date then id.
pub async fn meals_between(
    db: &PgPool,
    user_id: Uuid,
    from: Date,
    until: Date,
) -> anyhow::Result<Vec<MealLog>> {
    let sql = format!(
        "SELECT {MEAL_COLUMNS} FROM meal_logs \
          WHERE user_id = $1 AND date >= $2 AND date < $3 ORDER BY date, id"
    );
    sqlx::query_as::<_, MealLog>(&sql)
        .bind(user_id)
        .bind(from)
        .bind(until)
        .fetch_all(db)
        .await
        .context("list meal logs in range")
}

pub async fn all_meals(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<MealLog>> {
    let sql = format!("SELECT {MEAL_COLUMNS} FROM meal_logs WHERE user_id = $1 ORDER BY date, id");
    sqlx::query_as::<_, MealLog>(&sql)
        .bind(user_id)
        .fetch_all(db)
        .await
        .context("list meal logs")
}

pub async fn exercises_between(
    db: &PgPool,
    user_id: Uuid,
    from: Date,
    until: Date,
) -> anyhow::Result<Vec<ExerciseLog>> {
    let sql = format!(
        "SELECT {EXERCISE_COLUMNS} FROM exercise_logs \
          WHERE user_id = $1 AND date >= $2 AND date < $3 ORDER BY date, id"
    );
    sqlx::query_as::<_, ExerciseLog>(&sql)
        .bind(user_id)
        .bind(from)
        .bind(until)
        .fetch_all(db)
        .await
        .context("list exercise logs in range")
}

pub async fn all_exercises(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<ExerciseLog>> {
    let sql = format!(
        "SELECT {EXERCISE_COLUMNS} FROM exercise_logs WHERE user_id = $1 ORDER BY date, id"
    );
    sqlx::query_as::<_, ExerciseLog>(&sql)
        .bind(user_id)
        .fetch_all(db)
        .await
        .context("list exercise logs")
}

/// `None` when the row does not exist or belongs to someone else.
pub async fn set_meal_eaten(
    db: &PgPool,
    user_id: Uuid,
    meal_id: i32,
    eaten: bool,
) -> anyhow::Result<Option<MealLog>> {
    let sql = format!(
        "UPDATE meal_logs SET eaten = $3 WHERE id = $1 AND user_id = $2 RETURNING {MEAL_COLUMNS}"
    );
    sqlx::query_as::<_, MealLog>(&sql)
        .bind(meal_id)
        .bind(user_id)
        .bind(eaten)
        .fetch_optional(db)
        .await
        .context("set meal eaten")
}

pub async fn set_exercise_completed(
    db: &PgPool,
    user_id: Uuid,
    exercise_log_id: i32,
    completed: bool,
) -> anyhow::Result<Option<ExerciseLog>> {
    let sql = format!(
        "UPDATE exercise_logs SET completed = $3 WHERE id = $1 AND user_id = $2 \
         RETURNING {EXERCISE_COLUMNS}"
    );
    sqlx::query_as::<_, ExerciseLog>(&sql)
        .bind(exercise_log_id)
        .bind(user_id)
        .bind(completed)
        .fetch_optional(db)
        .await
        .context("set exercise completed")
}

pub async fn shopping_list(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<ShoppingItem>> {
    sqlx::query_as::<_, ShoppingItem>(
        r#"
        SELECT id, name, qty, category, checked
          FROM shopping_items
         WHERE user_id = $1
         ORDER BY category, name
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
    .context("list shopping items")
}

/// Swap the user's whole list for `items` in one transaction.
pub async fn replace_shopping_list(
    db: &PgPool,
    user_id: Uuid,
    items: &[NewShoppingItem],
) -> anyhow::Result<Vec<ShoppingItem>> {
    let mut tx = db.begin().await.context("begin tx")?;

    sqlx::query("DELETE FROM shopping_items WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .context("clear shopping list")?;

    let mut created = Vec::with_capacity(items.len());
    for item in items {
        let row = sqlx::query_as::<_, ShoppingItem>(
            r#"
            INSERT INTO shopping_items (user_id, name, qty, category, checked)
            VALUES ($1, $2, $3, $4, false)
            RETURNING id, name, qty, category, checked
            "#,
        )
        .bind(user_id)
        .bind(&item.name)
        .bind(&item.qty)
        .bind(&item.category)
        .fetch_one(&mut *tx)
        .await
        .context("insert shopping item")?;
        created.push(row);
    }

    tx.commit().await.context("commit tx")?;
    Ok(created)
}
