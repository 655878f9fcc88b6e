use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::warn;

use super::repo_types::{Exercise, Recipe, SimpleFood};

/// Read-only access to the reference dataset. Every listing is ordered by id
/// descending and capped by the caller.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn recipes(&self, limit: i64) -> anyhow::Result<Vec<Recipe>>;
    async fn simple_foods(&self, limit: i64) -> anyhow::Result<Vec<SimpleFood>>;
    async fn exercises(&self, limit: i64) -> anyhow::Result<Vec<Exercise>>;
    async fn simple_foods_by_ids(&self, ids: &[i32]) -> anyhow::Result<Vec<SimpleFood>>;
}

#[derive(Clone)]
pub struct PgCatalog {
    db: PgPool,
}

impl PgCatalog {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

// Some dataset dumps ship the foods table as `simple_fods`.
const FOOD_TABLES: [&str; 2] = ["simple_foods", "simple_fods"];

fn food_columns() -> &'static str {
    "id, name, category, calories::float8 AS calories, proteins::float8 AS proteins, \
     carbs::float8 AS carbs, fats::float8 AS fats, fiber::float8 AS fiber, glycemic_index, \
     (COALESCE(is_allergen::int, 0) <> 0) AS is_allergen"
}

fn all_tables_failed(last_err: Option<sqlx::Error>, what: &'static str) -> anyhow::Error {
    match last_err {
        Some(e) => anyhow::Error::new(e).context(what),
        None => anyhow::anyhow!("{what}: no food table to query"),
    }
}

#[async_trait]
impl Catalog for PgCatalog {
    async fn recipes(&self, limit: i64) -> anyhow::Result<Vec<Recipe>> {
        let rows = sqlx::query_as::<_, Recipe>(
            r#"
            SELECT id, plate_name, meal_type, goal_affinity,
                   total_calories::float8 AS total_calories, macro_ratio, difficulty,
                   to_jsonb(ingredients_list) AS ingredients_list, instructions
              FROM recipes
             ORDER BY id DESC
             LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.db)
        .await
        .context("list recipes")?;
        Ok(rows)
    }

    async fn simple_foods(&self, limit: i64) -> anyhow::Result<Vec<SimpleFood>> {
        let mut last_err = None;
        for table in FOOD_TABLES {
            let sql = format!(
                "SELECT {} FROM {} ORDER BY id DESC LIMIT $1",
                food_columns(),
                table
            );
            match sqlx::query_as::<_, SimpleFood>(&sql)
                .bind(limit)
                .fetch_all(&self.db)
                .await
            {
                Ok(rows) => return Ok(rows),
                Err(e) => {
                    warn!(error = %e, table, "simple food listing failed");
                    last_err = Some(e);
                }
            }
        }
        Err(all_tables_failed(last_err, "list simple foods"))
    }

    async fn exercises(&self, limit: i64) -> anyhow::Result<Vec<Exercise>> {
        let rows = sqlx::query_as::<_, Exercise>(
            r#"
            SELECT id, name, category, goal, type, muscle_group, equipment, difficulty
              FROM exercises
             ORDER BY id DESC
             LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.db)
        .await
        .context("list exercises")?;
        Ok(rows)
    }

    async fn simple_foods_by_ids(&self, ids: &[i32]) -> anyhow::Result<Vec<SimpleFood>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut last_err = None;
        for table in FOOD_TABLES {
            let sql = format!(
                "SELECT {} FROM {} WHERE id = ANY($1) ORDER BY id",
                food_columns(),
                table
            );
            match sqlx::query_as::<_, SimpleFood>(&sql)
                .bind(ids)
                .fetch_all(&self.db)
                .await
            {
                Ok(rows) => return Ok(rows),
                Err(e) => {
                    warn!(error = %e, table, "simple food lookup failed");
                    last_err = Some(e);
                }
            }
        }
        Err(all_tables_failed(last_err, "simple foods by ids"))
    }
}
