use time::Date;
use tracing::{info, warn};
use uuid::Uuid;

use super::repo::{PlanStore, UnitOfWork};
use super::types::{DietDay, NewPlan, WorkoutDay};
use crate::dates::add_days;
use crate::profile::mutation::ProfileUpdate;
use crate::tracking::repo_types::{NewExerciseLog, NewMealLog};

/// Per-date rows of one regenerated week, starting today.
#[derive(Debug, Clone)]
pub enum LogRows {
    Meals(Vec<NewMealLog>),
    Exercises(Vec<NewExerciseLog>),
}

pub fn meal_rows(days: &[DietDay], today: Date) -> Vec<NewMealLog> {
    days.iter()
        .enumerate()
        .flat_map(|(index, day)| {
            let date = add_days(today, index as i64);
            day.meals.iter().map(move |m| NewMealLog {
                date,
                meal_type: m.meal_type,
                name: m.recipe_name.clone(),
                recipe_id: m.recipe_id,
                simple_food_ids: m.simple_food_ids.clone(),
                calories: m.calories,
                protein_g: m.protein_g,
                carbs_g: m.carbs_g,
                fat_g: m.fat_g,
                ingredients: m.ingredients.clone(),
                instructions: m.instructions.clone(),
            })
        })
        .collect()
}

pub fn exercise_rows(days: &[WorkoutDay], today: Date) -> Vec<NewExerciseLog> {
    days.iter()
        .enumerate()
        .flat_map(|(index, day)| {
            let date = add_days(today, index as i64);
            day.exercises.iter().map(move |e| NewExerciseLog {
                date,
                weekday: day.weekday.to_owned(),
                name: e.name.clone(),
                exercise_id: e.exercise_id,
                sets: e.sets.clone(),
                notes: e.notes.clone(),
                duration_min: day.duration_min,
                intensity: day.intensity.clone(),
            })
        })
        .collect()
}

/// One regeneration's writes.
pub struct PlanWrite<'a> {
    pub user_id: Uuid,
    pub today: Date,
    /// Set when the message changed the profile.
    pub profile: Option<&'a ProfileUpdate>,
    pub plan: NewPlan<'a>,
    pub rows: LogRows,
}

async fn apply(uow: &mut dyn UnitOfWork, write: &PlanWrite<'_>) -> anyhow::Result<()> {
    let user_id = write.user_id;
    // Only the changed fields are carried onto the freshly locked row.
    if let Some(update) = write.profile {
        match uow.lock_profile(user_id).await? {
            Some(current) => uow.update_profile(user_id, &update.rebase(&current)).await?,
            None => warn!(%user_id, "profile row missing, changes not written"),
        }
    }
    uow.insert_plan(user_id, &write.plan).await?;
    uow.insert_chat_record(user_id, &write.plan).await?;

    match &write.rows {
        LogRows::Meals(rows) => {
            let removed = uow.delete_meal_logs_from(user_id, write.today).await?;
            for row in rows {
                uow.insert_meal_log(user_id, row).await?;
            }
            info!(%user_id, removed, inserted = rows.len(), "meal window replaced");
        }
        LogRows::Exercises(rows) => {
            let removed = uow.delete_exercise_logs_from(user_id, write.today).await?;
            for row in rows {
                uow.insert_exercise_log(user_id, row).await?;
            }
            info!(%user_id, removed, inserted = rows.len(), "exercise window replaced");
        }
    }
    Ok(())
}

/// Replace everything dated today or later in one unit of work. On any
/// failure the unit is rolled back and nothing is visible.
pub async fn replace_forward_window(
    store: &dyn PlanStore,
    write: &PlanWrite<'_>,
) -> anyhow::Result<()> {
    let mut uow = store.begin().await?;
    match apply(uow.as_mut(), write).await {
        Ok(()) => uow.commit().await,
        Err(e) => {
            if let Err(rollback_err) = uow.rollback().await {
                warn!(error = %rollback_err, "rollback failed");
            }
            Err(e)
        }
    }
}
