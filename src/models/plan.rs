use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::collections::HashSet;

use super::workout::{move_item, ModelError, Workout};

fn default_repeat_count() -> u32 {
  1
}

/// A block of workouts, performed `repeat_count` times in a row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Week {
  pub id: String,
  pub name: String,
  #[serde(default = "default_repeat_count")]
  pub repeat_count: u32,
  pub workouts: Vec<Workout>,
}

impl Week {
  pub fn new(id: impl Into<String>, name: impl Into<String>, workouts: Vec<Workout>) -> Self {
    Self {
      id: id.into(),
      name: name.into(),
      repeat_count: 1,
      workouts,
    }
  }

  pub fn repeated(mut self, repeat_count: u32) -> Self {
    self.repeat_count = repeat_count;
    self
  }

  /// Number of sessions this week stands for once repeats are unrolled
  pub fn total_sessions(&self) -> usize {
    self.workouts.len() * self.repeat_count as usize
  }

  pub fn add_workout(&mut self, workout: Workout) {
    self.workouts.push(workout);
  }

  /// Reorder workouts inside the week; `to` is the final position
  pub fn move_workout(&mut self, from: usize, to: usize) -> Result<(), ModelError> {
    move_item(&mut self.workouts, from, to)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingPlan {
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default)]
  pub system_icon_name: Option<String>,
  #[serde(default)]
  pub weeks: Vec<Week>,
  #[serde(default)]
  pub created_at: Option<DateTime<Utc>>,
  #[serde(default)]
  pub last_updated_at: Option<DateTime<Utc>>,
}

impl TrainingPlan {
  pub fn new(id: impl Into<String>, name: impl Into<String>, weeks: Vec<Week>) -> Self {
    Self {
      id: id.into(),
      name: name.into(),
      description: None,
      system_icon_name: None,
      weeks,
      created_at: None,
      last_updated_at: None,
    }
  }

  /// Locate a workout anywhere in the plan, searching weeks in order
  pub fn find_workout(&self, workout_id: i64) -> Option<&Workout> {
    self
      .weeks
      .iter()
      .flat_map(|w| w.workouts.iter())
      .find(|w| w.id == workout_id)
  }

  /// Mutable handle on a plan-hosted workout, for performing it in place
  pub fn find_workout_mut(&mut self, workout_id: i64) -> Option<&mut Workout> {
    self
      .weeks
      .iter_mut()
      .flat_map(|w| w.workouts.iter_mut())
      .find(|w| w.id == workout_id)
  }

  pub fn total_sessions(&self) -> usize {
    self.weeks.iter().map(Week::total_sessions).sum()
  }

  /// Append an empty week named after its position, e.g. "Week 3"
  pub fn add_week(&mut self, id: impl Into<String>) -> &mut Week {
    let name = format!("Week {}", self.weeks.len() + 1);
    self.weeks.push(Week::new(id, name, Vec::new()));
    let last = self.weeks.len() - 1;
    &mut self.weeks[last]
  }

  pub fn add_workout(&mut self, week_index: usize, workout: Workout) -> Result<(), ModelError> {
    self.week_mut(week_index)?.add_workout(workout);
    Ok(())
  }

  pub fn move_workout_in_week(
    &mut self,
    week_index: usize,
    from: usize,
    to: usize,
  ) -> Result<(), ModelError> {
    self.week_mut(week_index)?.move_workout(from, to)
  }

  /// Remove a workout from whichever week holds it
  pub fn delete_workout(&mut self, workout_id: i64) -> Option<Workout> {
    self.weeks.iter_mut().find_map(|week| {
      let index = week.workouts.iter().position(|w| w.id == workout_id)?;
      Some(week.workouts.remove(index))
    })
  }

  fn week_mut(&mut self, week_index: usize) -> Result<&mut Week, ModelError> {
    let len = self.weeks.len();
    self
      .weeks
      .get_mut(week_index)
      .ok_or(ModelError::PositionOutOfRange { index: week_index, len })
  }

  pub fn validate(&self) -> Result<(), ModelError> {
    let mut seen = HashSet::new();
    for week in &self.weeks {
      if week.repeat_count == 0 {
        return Err(ModelError::InvalidRepeatCount(week.id.clone()));
      }
      for workout in &week.workouts {
        if !seen.insert(workout.id) {
          return Err(ModelError::DuplicateWorkoutId(workout.id));
        }
        workout.validate()?;
      }
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::*;

  fn workout_named(id: i64, name: &str) -> Workout {
    let mut workout = sample_workout();
    workout.id = id;
    workout.name = name.to_string();
    workout
  }

  fn make_plan() -> TrainingPlan {
    TrainingPlan::new(
      "plan-1",
      "RAW Strength",
      vec![
        Week::new("w1", "Intro", vec![sample_workout()]),
        Week::new("w2", "Build", vec![workout_named(3, "Squat Day"), workout_named(2, "Bench Day")])
          .repeated(3),
      ],
    )
  }

  #[test]
  fn test_find_workout_searches_all_weeks() {
    let plan = make_plan();
    let found = plan.find_workout(2).expect("Should find workout in second week");
    assert_eq!(found.name, "Bench Day");
    assert!(plan.find_workout(42).is_none());
  }

  #[test]
  fn test_total_sessions_unrolls_repeats() {
    let plan = make_plan();
    // 1 x 1 + 2 x 3
    assert_eq!(plan.total_sessions(), 7);
  }

  #[test]
  fn test_zero_repeat_count_is_rejected() {
    let mut plan = make_plan();
    plan.weeks[0].repeat_count = 0;
    assert_eq!(
      plan.validate(),
      Err(ModelError::InvalidRepeatCount("w1".to_string()))
    );
  }

  #[test]
  fn test_duplicate_workout_ids_are_rejected() {
    let mut plan = make_plan();
    plan.weeks[1].add_workout(sample_workout());
    assert_eq!(plan.validate(), Err(ModelError::DuplicateWorkoutId(1)));
  }

  #[test]
  fn test_add_week_names_by_position() {
    let mut plan = make_plan();

    let week = plan.add_week("w3");
    assert_eq!(week.name, "Week 3");
    assert_eq!(week.repeat_count, 1);

    plan.add_workout(2, workout_named(4, "Deload")).expect("Week 3 exists");
    assert_eq!(plan.find_workout(4).map(|w| w.name.as_str()), Some("Deload"));
    assert!(plan.validate().is_ok());
    assert_eq!(
      plan.add_workout(7, workout_named(5, "Nowhere")),
      Err(ModelError::PositionOutOfRange { index: 7, len: 3 })
    );
  }

  #[test]
  fn test_move_workout_in_week() {
    let mut plan = make_plan();

    plan.move_workout_in_week(1, 1, 0).expect("Should reorder");

    let ids: Vec<_> = plan.weeks[1].workouts.iter().map(|w| w.id).collect();
    assert_eq!(ids, vec![2, 3]);
    assert!(plan.move_workout_in_week(1, 0, 2).is_err());
    assert!(plan.move_workout_in_week(5, 0, 0).is_err());
  }

  #[test]
  fn test_delete_workout_from_any_week() {
    let mut plan = make_plan();

    let removed = plan.delete_workout(3).expect("Should remove workout 3");

    assert_eq!(removed.name, "Squat Day");
    assert_eq!(plan.weeks[1].workouts.len(), 1);
    assert_eq!(plan.total_sessions(), 4);
    assert!(plan.delete_workout(3).is_none());
  }

  #[test]
  fn test_week_defaults_repeat_count() {
    let json = r#"{ "id": "w9", "name": "Deload", "workouts": [] }"#;
    let week: Week = serde_json::from_str(json).expect("Should parse week");
    assert_eq!(week.repeat_count, 1);
    assert!(week.workouts.is_empty());
  }
}
