//! Commands for the workout clock and the recap screen

use chrono::Utc;

use crate::analysis::WorkoutRecap;
use crate::db::{load_history, load_workout, record_completed_workout, save_workout, AppState, CompletedWorkout};
use crate::models::Workout;

/// Start the clock explicitly (the first handled set also starts it)
pub async fn start_workout(state: &AppState, workout_id: i64) -> Result<Workout, String> {
    let mut workout = load_workout(&state.db, workout_id)
        .await
        .map_err(|e| format!("Failed to load workout: {}", e))?;

    workout
        .start_session(Utc::now())
        .map_err(|e| e.to_string())?;

    save_workout(&state.db, &workout)
        .await
        .map_err(|e| format!("Failed to save workout: {}", e))?;

    Ok(workout)
}

/// Stop the clock, archive the finished session and reset the workout for next time.
/// Returns the recap of the session as it was performed.
pub async fn finish_workout(state: &AppState, workout_id: i64) -> Result<WorkoutRecap, String> {
    let mut workout = load_workout(&state.db, workout_id)
        .await
        .map_err(|e| format!("Failed to load workout: {}", e))?;

    workout.end_session(Utc::now()).map_err(|e| e.to_string())?;
    let recap = WorkoutRecap::compute(&workout);

    record_completed_workout(&state.db, &workout)
        .await
        .map_err(|e| format!("Failed to record workout: {}", e))?;

    workout.reset_for_replay();
    save_workout(&state.db, &workout)
        .await
        .map_err(|e| format!("Failed to save workout: {}", e))?;

    Ok(recap)
}

/// Recap of the workout in its current state
pub async fn get_workout_recap(state: &AppState, workout_id: i64) -> Result<WorkoutRecap, String> {
    let workout = load_workout(&state.db, workout_id)
        .await
        .map_err(|e| format!("Failed to load workout: {}", e))?;
    Ok(WorkoutRecap::compute(&workout))
}

pub async fn get_workout_history(
    state: &AppState,
    workout_id: i64,
) -> Result<Vec<CompletedWorkout>, String> {
    load_history(&state.db, workout_id)
        .await
        .map_err(|e| format!("Failed to load workout history: {}", e))
}
