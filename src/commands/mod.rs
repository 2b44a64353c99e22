pub mod editor;
pub mod progression;
pub mod session;

use crate::db::{list_plans, list_workouts, load_plan, load_workout, AppState};
use crate::models::{TrainingPlan, Workout};

pub async fn get_workouts(state: &AppState) -> Result<Vec<Workout>, String> {
  list_workouts(&state.db)
    .await
    .map_err(|e| format!("Failed to fetch workouts: {}", e))
}

pub async fn get_workout(state: &AppState, workout_id: i64) -> Result<Workout, String> {
  load_workout(&state.db, workout_id)
    .await
    .map_err(|e| format!("Failed to fetch workout: {}", e))
}

pub async fn get_plans(state: &AppState) -> Result<Vec<TrainingPlan>, String> {
  list_plans(&state.db)
    .await
    .map_err(|e| format!("Failed to fetch training plans: {}", e))
}

/// Look a workout up inside a training plan
pub async fn get_plan_workout(
  state: &AppState,
  plan_id: String,
  workout_id: i64,
) -> Result<Workout, String> {
  let plan = load_plan(&state.db, &plan_id)
    .await
    .map_err(|e| format!("Failed to fetch training plan: {}", e))?;

  plan
    .find_workout(workout_id)
    .cloned()
    .ok_or_else(|| "Training not found in this plan".to_string())
}
