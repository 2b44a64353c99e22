//! Commands for performing a workout set by set

use chrono::Utc;

use crate::db::{load_plan, load_workout, save_plan, save_workout, AppState};
use crate::models::Workout;
use crate::progression::{AdvanceOutcome, ProgressionError};

/// Load, mutate and save one workout.
///
/// A `SessionStarted` event in the outcome starts the workout clock before
/// the document is written back.
async fn mutate_workout<F>(
    state: &AppState,
    workout_id: i64,
    mutation: F,
) -> Result<AdvanceOutcome, String>
where
    F: FnOnce(&mut Workout) -> Result<AdvanceOutcome, ProgressionError>,
{
    let mut workout = load_workout(&state.db, workout_id)
        .await
        .map_err(|e| format!("Failed to load workout: {}", e))?;

    let outcome = mutation(&mut workout).map_err(|e| e.to_string())?;

    if outcome.starts_session() {
        workout
            .start_session(Utc::now())
            .map_err(|e| e.to_string())?;
    }

    save_workout(&state.db, &workout)
        .await
        .map_err(|e| format!("Failed to save workout: {}", e))?;

    Ok(outcome)
}

/// Same as `mutate_workout` for a workout that lives inside a training plan.
/// The whole plan document is written back.
async fn mutate_plan_workout<F>(
    state: &AppState,
    plan_id: &str,
    workout_id: i64,
    mutation: F,
) -> Result<AdvanceOutcome, String>
where
    F: FnOnce(&mut Workout) -> Result<AdvanceOutcome, ProgressionError>,
{
    let mut plan = load_plan(&state.db, plan_id)
        .await
        .map_err(|e| format!("Failed to load training plan: {}", e))?;

    let workout = plan
        .find_workout_mut(workout_id)
        .ok_or_else(|| "Training not found in this plan".to_string())?;

    let outcome = mutation(workout).map_err(|e| e.to_string())?;

    if outcome.starts_session() {
        workout
            .start_session(Utc::now())
            .map_err(|e| e.to_string())?;
    }

    save_plan(&state.db, &plan)
        .await
        .map_err(|e| format!("Failed to save training plan: {}", e))?;

    Ok(outcome)
}

/// Advance an exercise: earliest pending set forward, or undo the last handled one
pub async fn advance_exercise(
    state: &AppState,
    workout_id: i64,
    exercise_id: i64,
    skip: bool,
) -> Result<AdvanceOutcome, String> {
    mutate_workout(state, workout_id, |w| w.advance(exercise_id, skip)).await
}

/// React to a tap on a set button
pub async fn activate_set(
    state: &AppState,
    workout_id: i64,
    set_id: i64,
    skip: bool,
) -> Result<AdvanceOutcome, String> {
    mutate_workout(state, workout_id, |w| w.activate_set(set_id, skip)).await
}

/// Complete the next pending set anywhere in the workout
pub async fn complete_next_set(
    state: &AppState,
    workout_id: i64,
) -> Result<AdvanceOutcome, String> {
    mutate_workout(state, workout_id, Workout::complete_next_set).await
}

pub async fn undo_set(
    state: &AppState,
    workout_id: i64,
    set_id: i64,
) -> Result<AdvanceOutcome, String> {
    mutate_workout(state, workout_id, |w| w.undo_set(set_id)).await
}

pub async fn mark_personal_record(
    state: &AppState,
    workout_id: i64,
    set_id: i64,
) -> Result<AdvanceOutcome, String> {
    mutate_workout(state, workout_id, |w| w.mark_personal_record(set_id)).await
}

pub async fn advance_plan_exercise(
    state: &AppState,
    plan_id: String,
    workout_id: i64,
    exercise_id: i64,
    skip: bool,
) -> Result<AdvanceOutcome, String> {
    mutate_plan_workout(state, &plan_id, workout_id, |w| w.advance(exercise_id, skip)).await
}

/// React to a tap on a set of a plan-hosted workout
pub async fn activate_plan_set(
    state: &AppState,
    plan_id: String,
    workout_id: i64,
    set_id: i64,
    skip: bool,
) -> Result<AdvanceOutcome, String> {
    mutate_plan_workout(state, &plan_id, workout_id, |w| w.activate_set(set_id, skip)).await
}

pub async fn complete_plan_next_set(
    state: &AppState,
    plan_id: String,
    workout_id: i64,
) -> Result<AdvanceOutcome, String> {
    mutate_plan_workout(state, &plan_id, workout_id, Workout::complete_next_set).await
}
