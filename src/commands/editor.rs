//! Commands for editing training plans and workout layouts

use crate::db::{load_plan, load_workout, save_plan, save_workout, AppState};
use crate::models::{ModelError, TrainingPlan, Workout};

async fn edit_plan<F>(state: &AppState, plan_id: &str, edit: F) -> Result<TrainingPlan, String>
where
    F: FnOnce(&mut TrainingPlan) -> Result<(), String>,
{
    let mut plan = load_plan(&state.db, plan_id)
        .await
        .map_err(|e| format!("Failed to load training plan: {}", e))?;

    edit(&mut plan)?;
    plan.validate().map_err(|e| e.to_string())?;

    save_plan(&state.db, &plan)
        .await
        .map_err(|e| format!("Failed to save training plan: {}", e))?;

    // Hand back the stamped version
    load_plan(&state.db, plan_id)
        .await
        .map_err(|e| format!("Failed to load training plan: {}", e))
}

pub async fn add_week(
    state: &AppState,
    plan_id: String,
    week_id: String,
) -> Result<TrainingPlan, String> {
    edit_plan(state, &plan_id, |plan| {
        plan.add_week(week_id);
        Ok(())
    })
    .await
}

pub async fn add_plan_workout(
    state: &AppState,
    plan_id: String,
    week_index: usize,
    workout: Workout,
) -> Result<TrainingPlan, String> {
    edit_plan(state, &plan_id, |plan| {
        plan.add_workout(week_index, workout).map_err(|e| e.to_string())
    })
    .await
}

pub async fn move_plan_workout(
    state: &AppState,
    plan_id: String,
    week_index: usize,
    from: usize,
    to: usize,
) -> Result<TrainingPlan, String> {
    edit_plan(state, &plan_id, |plan| {
        plan.move_workout_in_week(week_index, from, to).map_err(|e| e.to_string())
    })
    .await
}

pub async fn delete_plan_workout(
    state: &AppState,
    plan_id: String,
    workout_id: i64,
) -> Result<TrainingPlan, String> {
    let plan = edit_plan(state, &plan_id, |plan| {
        plan.delete_workout(workout_id)
            .map(|_| ())
            .ok_or_else(|| "Training not found in this plan".to_string())
    })
    .await?;

    tracing::info!(plan_id = %plan.id, workout_id, "workout removed from plan");
    Ok(plan)
}

/// Move an exercise to a new position inside one group of a stored workout
pub async fn reorder_exercise(
    state: &AppState,
    workout_id: i64,
    group_index: usize,
    from: usize,
    to: usize,
) -> Result<Workout, String> {
    let mut workout = load_workout(&state.db, workout_id)
        .await
        .map_err(|e| format!("Failed to load workout: {}", e))?;

    let len = workout.groups.len();
    let group = workout
        .groups
        .get_mut(group_index)
        .ok_or(ModelError::PositionOutOfRange { index: group_index, len })
        .map_err(|e| e.to_string())?;
    group.move_exercise(from, to).map_err(|e| e.to_string())?;

    save_workout(&state.db, &workout)
        .await
        .map_err(|e| format!("Failed to save workout: {}", e))?;

    Ok(workout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Week;
    use crate::test_utils::*;

    async fn seeded_state() -> AppState {
        let pool = setup_test_db().await;
        save_workout(&pool, &sample_workout())
            .await
            .expect("Should seed workout");
        let plan = TrainingPlan::new("p1", "Strength", vec![Week::new("w1", "Base", vec![sample_workout()])]);
        save_plan(&pool, &plan).await.expect("Should seed plan");
        AppState { db: pool }
    }

    fn workout_with_id(id: i64) -> Workout {
        let mut workout = single_exercise_workout(&[(1, 10, 0.0)]);
        workout.id = id;
        workout
    }

    #[tokio::test]
    async fn test_build_out_a_plan() {
        // Arrange
        let state = seeded_state().await;

        // Act
        add_week(&state, "p1".into(), "w2".into()).await.expect("Should add week");
        add_plan_workout(&state, "p1".into(), 1, workout_with_id(2)).await.unwrap();
        let plan = add_plan_workout(&state, "p1".into(), 1, workout_with_id(3)).await.unwrap();

        // Assert
        assert_eq!(plan.weeks.len(), 2);
        assert_eq!(plan.weeks[1].name, "Week 2");
        assert_eq!(plan.total_sessions(), 3);
        assert!(plan.last_updated_at.is_some());

        let plan = move_plan_workout(&state, "p1".into(), 1, 1, 0).await.unwrap();
        let ids: Vec<_> = plan.weeks[1].workouts.iter().map(|w| w.id).collect();
        assert_eq!(ids, vec![3, 2]);

        teardown_test_db(state.db).await;
    }

    #[tokio::test]
    async fn test_plan_edits_that_break_invariants_are_not_saved() {
        let state = seeded_state().await;

        // Workout 1 already lives in week 1
        let err = add_plan_workout(&state, "p1".into(), 0, sample_workout()).await.unwrap_err();
        assert!(err.contains("appears more than once"), "{}", err);

        let err = move_plan_workout(&state, "p1".into(), 0, 0, 4).await.unwrap_err();
        assert!(err.contains("out of range"), "{}", err);

        let stored = load_plan(&state.db, "p1").await.unwrap();
        assert_eq!(stored.weeks[0].workouts.len(), 1);

        teardown_test_db(state.db).await;
    }

    #[tokio::test]
    async fn test_delete_plan_workout() {
        let state = seeded_state().await;

        let plan = delete_plan_workout(&state, "p1".into(), 1).await.expect("Should delete");
        assert_eq!(plan.total_sessions(), 0);

        let err = delete_plan_workout(&state, "p1".into(), 1).await.unwrap_err();
        assert_eq!(err, "Training not found in this plan");

        teardown_test_db(state.db).await;
    }

    #[tokio::test]
    async fn test_reorder_exercise_persists() {
        let state = seeded_state().await;

        let workout = reorder_exercise(&state, 1, 0, 0, 2).await.expect("Should reorder");
        let order: Vec<_> = workout.groups[0].exercises.iter().map(|e| e.id).collect();
        assert_eq!(order, vec![12, 13, 11]);

        let stored = load_workout(&state.db, 1).await.unwrap();
        assert_eq!(stored, workout);
        assert!(reorder_exercise(&state, 1, 9, 0, 1).await.is_err());

        teardown_test_db(state.db).await;
    }
}
