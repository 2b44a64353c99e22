//! Test utilities and helpers for unit testing
//!
//! This module provides common test infrastructure including:
//! - Database setup/teardown
//! - Workout factories
//! - Fixed timestamps

use crate::models::{Exercise, Group, Workout, WorkoutSet};
use chrono::{DateTime, TimeZone, Utc};
use sqlx::SqlitePool;

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases, which would cause intermittent test failures
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// ---------------------------------------------------------------------------
/// Workout Factories
/// ---------------------------------------------------------------------------

/// Build an exercise from `(set_id, reps, weight)` tuples; set numbers follow list order
pub fn make_exercise(id: i64, name: &str, sets: &[(i64, u32, f64)]) -> Exercise {
  let sets = sets
    .iter()
    .enumerate()
    .map(|(i, &(set_id, reps, weight))| WorkoutSet::new(set_id, i as u32 + 1, reps, weight))
    .collect();

  Exercise::new(id, name, "", sets).expect("Factory sets are ordered")
}

/// Workout with one group holding exercise 1 ("Push-ups")
pub fn single_exercise_workout(sets: &[(i64, u32, f64)]) -> Workout {
  Workout::new(
    1,
    "Quick Session",
    vec![Group::new(1, "Main", vec![make_exercise(1, "Push-ups", sets)])],
  )
}

/// Three-group deadlift day: 7 exercises, 20 sets
pub fn sample_workout() -> Workout {
  let warmup = Group::new(
    1,
    "Warmup",
    vec![
      make_exercise(11, "Cat-Cow Stretches", &[(111, 10, 0.0), (112, 10, 0.0)]),
      make_exercise(12, "Glute Bridges", &[(121, 10, 0.0), (122, 10, 0.0)]),
      make_exercise(13, "Bird-Dog", &[(131, 10, 0.0), (132, 10, 0.0)]),
    ],
  )
  .with_expected_duration(10);

  let main_lift = Group::new(
    2,
    "Main Lift",
    vec![make_exercise(21, "Deadlift", &[(221, 3, 150.0), (222, 3, 160.0), (223, 3, 160.0)])],
  )
  .with_expected_duration(20);

  let accessories = Group::new(
    3,
    "Accessories",
    vec![
      make_exercise(
        31,
        "Deficit Deadlift",
        &[(311, 3, 100.0), (312, 3, 110.0), (313, 3, 120.0), (314, 3, 130.0)],
      ),
      make_exercise(
        32,
        "Bendover Barbell Row",
        &[(321, 3, 50.0), (322, 3, 60.0), (323, 3, 70.0), (324, 3, 70.0)],
      ),
      make_exercise(33, "Strict Military Press", &[(331, 6, 40.0), (332, 6, 40.0), (333, 6, 40.0)]),
    ],
  )
  .with_expected_duration(25);

  let mut workout = Workout::new(1, "Deadlift", vec![warmup, main_lift, accessories]);
  workout.description = "Heavy pull day".to_string();
  workout
}

/// Deterministic "now" for clock related assertions
pub fn fixed_time() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2025, 3, 19, 18, 0, 0).unwrap()
}
