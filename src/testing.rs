//! In-memory doubles and fixtures shared by the unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::catalog::{Catalog, Exercise, Recipe, SimpleFood};
use crate::oracle::{GenerationError, JsonOracle, OracleRequest};
use crate::plans::repo::{PlanStore, UnitOfWork};
use crate::plans::types::{ChatRecord, NewPlan, PlanKind, PlanRecord};
use crate::profile::{ActivityLevel, UserProfile, UserWithProfile};
use crate::tracking::repo_types::{NewExerciseLog, NewMealLog};

pub fn profile_fixture() -> UserProfile {
    UserProfile {
        gender: "MALE".into(),
        age_yrs: 30,
        height_cm: 178.0,
        weight_kg: 80.0,
        target_weight_kg: 75.0,
        goals: vec!["Maintain".into()],
        workout_locations: vec!["Gym".into()],
        diets: vec!["Balanced".into()],
        allergies: vec![],
        activity_level: ActivityLevel::ModeratelyActive,
        meals_per_day: 3,
        macro_velocity: "AI_RECOMMENDED".into(),
        protein_g: 160,
        carbs_g: 300,
        fat_g: 70,
    }
}

pub fn user_fixture() -> UserWithProfile {
    UserWithProfile {
        id: Uuid::new_v4(),
        email: "athlete@example.com".into(),
        profile: profile_fixture(),
    }
}

pub fn recipe_fixture(
    id: i32,
    calories: f64,
    macro_ratio: Option<&str>,
    ingredients: Option<Value>,
) -> Recipe {
    Recipe {
        id,
        plate_name: format!("Recipe {id}"),
        meal_type: "Lunch".into(),
        goal_affinity: "Maintain".into(),
        total_calories: calories,
        macro_ratio: macro_ratio.map(str::to_owned),
        difficulty: "Easy".into(),
        ingredients_list: ingredients,
        instructions: Some("Prep. Cook. Serve.".into()),
    }
}

pub fn food_fixture(id: i32, name: &str) -> SimpleFood {
    SimpleFood {
        id,
        name: name.into(),
        category: "Produce".into(),
        calories: 100.0,
        proteins: 5.0,
        carbs: 10.0,
        fats: 2.0,
        fiber: 1.0,
        glycemic_index: "Low".into(),
        is_allergen: false,
    }
}

pub fn exercise_fixture(id: i32, name: &str) -> Exercise {
    Exercise {
        id,
        name: name.into(),
        category: "Strength".into(),
        goal: "Build Muscle".into(),
        kind: "strength".into(),
        muscle_group: "Legs".into(),
        equipment: "Barbell".into(),
        difficulty: "Intermediate".into(),
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryData {
    pub profiles: HashMap<Uuid, UserProfile>,
    pub plans: Vec<(PlanKind, PlanRecord)>,
    pub chats: Vec<ChatRecord>,
    pub meal_logs: Vec<(Uuid, NewMealLog)>,
    pub exercise_logs: Vec<(Uuid, NewExerciseLog)>,
    next_id: i32,
}

impl MemoryData {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    pub fn meal_dates(&self, user_id: Uuid) -> Vec<Date> {
        self.meal_logs
            .iter()
            .filter(|(owner, _)| *owner == user_id)
            .map(|(_, row)| row.date)
            .collect()
    }
}

/// Catalog and plan store backed by plain vectors. A unit of work edits a
/// private copy that replaces the shared data on commit.
#[derive(Clone, Default)]
pub struct MemoryStore {
    data: Arc<Mutex<MemoryData>>,
    pub recipes: Vec<Recipe>,
    pub foods: Vec<SimpleFood>,
    pub exercises: Vec<Exercise>,
    pub fail_log_inserts: bool,
}

impl MemoryStore {
    pub fn with_catalog(
        recipes: Vec<Recipe>,
        foods: Vec<SimpleFood>,
        exercises: Vec<Exercise>,
    ) -> Self {
        Self {
            recipes,
            foods,
            exercises,
            ..Default::default()
        }
    }

    /// Store the user's profile row, as registration would.
    pub fn seed_profile(&self, user: &UserWithProfile) {
        self.update(|d| {
            d.profiles.insert(user.id, user.profile.clone());
        });
    }

    pub fn snapshot(&self) -> MemoryData {
        self.data.lock().unwrap().clone()
    }

    pub fn update(&self, f: impl FnOnce(&mut MemoryData)) {
        f(&mut self.data.lock().unwrap());
    }
}

fn capped<T: Clone>(rows: &[T], limit: i64) -> Vec<T> {
    rows.iter().take(limit.max(0) as usize).cloned().collect()
}

#[async_trait]
impl Catalog for MemoryStore {
    async fn recipes(&self, limit: i64) -> anyhow::Result<Vec<Recipe>> {
        Ok(capped(&self.recipes, limit))
    }

    async fn simple_foods(&self, limit: i64) -> anyhow::Result<Vec<SimpleFood>> {
        Ok(capped(&self.foods, limit))
    }

    async fn exercises(&self, limit: i64) -> anyhow::Result<Vec<Exercise>> {
        Ok(capped(&self.exercises, limit))
    }

    async fn simple_foods_by_ids(&self, ids: &[i32]) -> anyhow::Result<Vec<SimpleFood>> {
        Ok(self
            .foods
            .iter()
            .filter(|f| ids.contains(&f.id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PlanStore for MemoryStore {
    async fn latest_plan(
        &self,
        user_id: Uuid,
        kind: PlanKind,
    ) -> anyhow::Result<Option<PlanRecord>> {
        let data = self.data.lock().unwrap();
        Ok(data
            .plans
            .iter()
            .filter(|(k, p)| *k == kind && p.user_id == user_id)
            .map(|(_, p)| p.clone())
            .max_by_key(|p| p.id))
    }

    async fn recent_chat_records(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> anyhow::Result<Vec<ChatRecord>> {
        let data = self.data.lock().unwrap();
        let mut rows: Vec<_> = data
            .chats
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by_key(|c| std::cmp::Reverse(c.id));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn begin(&self) -> anyhow::Result<Box<dyn UnitOfWork>> {
        let work = self.snapshot();
        Ok(Box::new(MemoryUnitOfWork {
            shared: Arc::clone(&self.data),
            work,
            fail_log_inserts: self.fail_log_inserts,
        }))
    }
}

pub struct MemoryUnitOfWork {
    shared: Arc<Mutex<MemoryData>>,
    work: MemoryData,
    fail_log_inserts: bool,
}

impl MemoryUnitOfWork {
    fn check_insert(&self) -> anyhow::Result<()> {
        if self.fail_log_inserts {
            anyhow::bail!("injected log insert failure");
        }
        Ok(())
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn lock_profile(&mut self, user_id: Uuid) -> anyhow::Result<Option<UserProfile>> {
        Ok(self.work.profiles.get(&user_id).cloned())
    }

    async fn update_profile(&mut self, user_id: Uuid, profile: &UserProfile) -> anyhow::Result<()> {
        self.work.profiles.insert(user_id, profile.clone());
        Ok(())
    }

    async fn insert_plan(&mut self, user_id: Uuid, plan: &NewPlan<'_>) -> anyhow::Result<i32> {
        let id = self.work.next_id();
        self.work.plans.push((
            plan.kind,
            PlanRecord {
                id,
                user_id,
                summary: plan.summary.to_owned(),
                plan_json: plan.plan_json.clone(),
                source_message: plan.source_message.to_owned(),
                mcp_changes: Some(plan.changes.clone()),
                created_at: OffsetDateTime::now_utc(),
            },
        ));
        Ok(id)
    }

    async fn insert_chat_record(
        &mut self,
        user_id: Uuid,
        plan: &NewPlan<'_>,
    ) -> anyhow::Result<()> {
        let id = self.work.next_id();
        self.work.chats.push(ChatRecord {
            id,
            user_id,
            plan_type: plan.kind.as_str().to_owned(),
            user_message: plan.source_message.to_owned(),
            ai_response_summary: plan.summary.to_owned(),
            mcp_changes: Some(plan.changes.clone()),
            created_at: OffsetDateTime::now_utc(),
        });
        Ok(())
    }

    async fn delete_meal_logs_from(&mut self, user_id: Uuid, from: Date) -> anyhow::Result<u64> {
        let before = self.work.meal_logs.len();
        self.work
            .meal_logs
            .retain(|(owner, row)| *owner != user_id || row.date < from);
        Ok((before - self.work.meal_logs.len()) as u64)
    }

    async fn insert_meal_log(&mut self, user_id: Uuid, row: &NewMealLog) -> anyhow::Result<()> {
        self.check_insert()?;
        self.work.meal_logs.push((user_id, row.clone()));
        Ok(())
    }

    async fn delete_exercise_logs_from(
        &mut self,
        user_id: Uuid,
        from: Date,
    ) -> anyhow::Result<u64> {
        let before = self.work.exercise_logs.len();
        self.work
            .exercise_logs
            .retain(|(owner, row)| *owner != user_id || row.date < from);
        Ok((before - self.work.exercise_logs.len()) as u64)
    }

    async fn insert_exercise_log(
        &mut self,
        user_id: Uuid,
        row: &NewExerciseLog,
    ) -> anyhow::Result<()> {
        self.check_insert()?;
        self.work.exercise_logs.push((user_id, row.clone()));
        Ok(())
    }

    async fn commit(self: Box<Self>) -> anyhow::Result<()> {
        let MemoryUnitOfWork { shared, work, .. } = *self;
        *shared.lock().unwrap() = work;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Replays canned oracle answers in order and records every request.
#[derive(Default)]
pub struct ScriptedOracle {
    answers: Mutex<VecDeque<Result<Value, GenerationError>>>,
    pub requests: Mutex<Vec<OracleRequest>>,
}

impl ScriptedOracle {
    pub fn with(answers: Vec<Result<Value, GenerationError>>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl JsonOracle for ScriptedOracle {
    async fn generate(&self, request: &OracleRequest) -> Result<Value, GenerationError> {
        self.requests.lock().unwrap().push(request.clone());
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(GenerationError::EmptyResponse))
    }
}
