use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::Row;

use crate::config::AppConfig;
use crate::models::{ModelError, TrainingPlan, Workout};

pub type DbPool = SqlitePool;

/// Application state holding the database connection pool
pub struct AppState {
  pub db: DbPool,
}

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("Migration error: {0}")]
  Migration(#[from] sqlx::migrate::MigrateError),

  #[error("Document encoding error: {0}")]
  Encoding(#[from] serde_json::Error),

  #[error("Invalid document: {0}")]
  Invalid(#[from] ModelError),

  #[error("Invalid timestamp: {0}")]
  Timestamp(#[from] chrono::ParseError),

  #[error("{kind} not found: {id}")]
  NotFound { kind: &'static str, id: String },
}

/// Initialize the database connection pool and run migrations
pub async fn initialize_db(config: &AppConfig) -> Result<DbPool, StoreError> {
  tracing::info!(url = %config.database_url, "initializing database");

  let pool = SqlitePoolOptions::new()
    .max_connections(config.max_connections)
    .connect(&config.database_url)
    .await?;

  sqlx::migrate!("./migrations").run(&pool).await?;

  tracing::info!("database initialized successfully");

  Ok(pool)
}

/// ---------------------------------------------------------------------------
/// Workouts
/// ---------------------------------------------------------------------------

/// Insert or replace a workout document
pub async fn save_workout(pool: &SqlitePool, workout: &Workout) -> Result<(), StoreError> {
  let document = serde_json::to_string(workout)?;

  sqlx::query(
    r#"
    INSERT INTO workouts (id, name, document, updated_at)
    VALUES (?1, ?2, ?3, ?4)
    ON CONFLICT(id) DO UPDATE SET
      name = excluded.name,
      document = excluded.document,
      updated_at = excluded.updated_at
    "#,
  )
  .bind(workout.id)
  .bind(&workout.name)
  .bind(&document)
  .bind(Utc::now().to_rfc3339())
  .execute(pool)
  .await?;

  tracing::info!(workout_id = workout.id, "workout saved");
  Ok(())
}

/// Load a workout document and check it against the model invariants
pub async fn load_workout(pool: &SqlitePool, workout_id: i64) -> Result<Workout, StoreError> {
  let row = sqlx::query("SELECT document FROM workouts WHERE id = ?1")
    .bind(workout_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| StoreError::NotFound {
      kind: "Workout",
      id: workout_id.to_string(),
    })?;

  let document: String = row.get("document");
  let workout: Workout = serde_json::from_str(&document)?;
  workout.validate()?;
  Ok(workout)
}

/// All stored workouts, by id
pub async fn list_workouts(pool: &SqlitePool) -> Result<Vec<Workout>, StoreError> {
  let rows = sqlx::query("SELECT document FROM workouts ORDER BY id")
    .fetch_all(pool)
    .await?;

  let mut workouts = Vec::with_capacity(rows.len());
  for row in rows {
    let document: String = row.get("document");
    let workout: Workout = serde_json::from_str(&document)?;
    workout.validate()?;
    workouts.push(workout);
  }
  Ok(workouts)
}

/// ---------------------------------------------------------------------------
/// Training Plans
/// ---------------------------------------------------------------------------

pub async fn save_plan(pool: &SqlitePool, plan: &TrainingPlan) -> Result<(), StoreError> {
  let now = Utc::now();
  let mut stamped = plan.clone();
  stamped.created_at = Some(plan.created_at.unwrap_or(now));
  stamped.last_updated_at = Some(now);
  let document = serde_json::to_string(&stamped)?;

  sqlx::query(
    r#"
    INSERT INTO training_plans (id, name, document, created_at, updated_at)
    VALUES (?1, ?2, ?3, ?4, ?5)
    ON CONFLICT(id) DO UPDATE SET
      name = excluded.name,
      document = excluded.document,
      updated_at = excluded.updated_at
    "#,
  )
  .bind(&plan.id)
  .bind(&plan.name)
  .bind(&document)
  .bind(now.to_rfc3339())
  .bind(now.to_rfc3339())
  .execute(pool)
  .await?;

  tracing::info!(plan_id = %plan.id, "training plan saved");
  Ok(())
}

pub async fn load_plan(pool: &SqlitePool, plan_id: &str) -> Result<TrainingPlan, StoreError> {
  let row = sqlx::query("SELECT document FROM training_plans WHERE id = ?1")
    .bind(plan_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| StoreError::NotFound {
      kind: "Training plan",
      id: plan_id.to_string(),
    })?;

  let document: String = row.get("document");
  let plan: TrainingPlan = serde_json::from_str(&document)?;
  plan.validate()?;
  Ok(plan)
}

/// All stored training plans, by name
pub async fn list_plans(pool: &SqlitePool) -> Result<Vec<TrainingPlan>, StoreError> {
  let rows = sqlx::query("SELECT document FROM training_plans ORDER BY name, id")
    .fetch_all(pool)
    .await?;

  let mut plans = Vec::with_capacity(rows.len());
  for row in rows {
    let document: String = row.get("document");
    let plan: TrainingPlan = serde_json::from_str(&document)?;
    plan.validate()?;
    plans.push(plan);
  }
  Ok(plans)
}

/// ---------------------------------------------------------------------------
/// Workout History
/// ---------------------------------------------------------------------------

/// A finished session as it looked before the replay reset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedWorkout {
  pub id: i64,
  pub workout_id: i64,
  pub name: String,
  pub started_at: Option<DateTime<Utc>>,
  pub ended_at: Option<DateTime<Utc>>,
  pub workout: Workout,
}

pub async fn record_completed_workout(
  pool: &SqlitePool,
  workout: &Workout,
) -> Result<i64, StoreError> {
  let document = serde_json::to_string(workout)?;

  let result = sqlx::query(
    r#"
    INSERT INTO completed_workouts (workout_id, name, started_at, ended_at, document, recorded_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
    "#,
  )
  .bind(workout.id)
  .bind(&workout.name)
  .bind(workout.start_time().map(|d| d.to_rfc3339()))
  .bind(workout.end_time().map(|d| d.to_rfc3339()))
  .bind(&document)
  .bind(Utc::now().to_rfc3339())
  .execute(pool)
  .await?;

  let id = result.last_insert_rowid();
  tracing::info!(workout_id = workout.id, history_id = id, "completed workout recorded");
  Ok(id)
}

/// Finished sessions for one workout, newest first
pub async fn load_history(
  pool: &SqlitePool,
  workout_id: i64,
) -> Result<Vec<CompletedWorkout>, StoreError> {
  let rows = sqlx::query(
    r#"
    SELECT id, workout_id, name, started_at, ended_at, document
    FROM completed_workouts
    WHERE workout_id = ?1
    ORDER BY ended_at DESC, id DESC
    "#,
  )
  .bind(workout_id)
  .fetch_all(pool)
  .await?;

  let mut history = Vec::with_capacity(rows.len());
  for row in rows {
    let started_at: Option<String> = row.get("started_at");
    let ended_at: Option<String> = row.get("ended_at");
    let document: String = row.get("document");
    let workout: Workout = serde_json::from_str(&document)?;
    workout.validate()?;

    history.push(CompletedWorkout {
      id: row.get("id"),
      workout_id: row.get("workout_id"),
      name: row.get("name"),
      started_at: started_at.as_deref().map(parse_timestamp).transpose()?,
      ended_at: ended_at.as_deref().map(parse_timestamp).transpose()?,
      workout,
    });
  }

  Ok(history)
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
  DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}
