use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub type SetId = i64;
pub type ExerciseId = i64;

/// ---------------------------------------------------------------------------
/// Document Errors
/// ---------------------------------------------------------------------------

/// Invariant violations found in a workout document
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
  #[error("Set {0} is both completed and skipped")]
  CompletedAndSkipped(SetId),

  #[error("Set {0} is skipped but marked as a personal record")]
  SkippedPersonalRecord(SetId),

  #[error("Exercise {exercise_id} has set number {set_number} out of order")]
  SetOrder { exercise_id: ExerciseId, set_number: u32 },

  #[error("Set id {0} appears more than once in the workout")]
  DuplicateSetId(SetId),

  #[error("Exercise id {0} appears more than once in the workout")]
  DuplicateExerciseId(ExerciseId),

  #[error("Workout id {0} appears more than once in the plan")]
  DuplicateWorkoutId(i64),

  #[error("Week {0} must repeat at least once")]
  InvalidRepeatCount(String),

  #[error("Position {index} is out of range for {len} items")]
  PositionOutOfRange { index: usize, len: usize },
}

/// Move one item of a list to a new position, shifting the ones in between
pub(crate) fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> Result<(), ModelError> {
  let len = items.len();
  for index in [from, to] {
    if index >= len {
      return Err(ModelError::PositionOutOfRange { index, len });
    }
  }
  let item = items.remove(from);
  items.insert(to, item);
  Ok(())
}

/// ---------------------------------------------------------------------------
/// Set
/// ---------------------------------------------------------------------------

/// One prescribed reps x load unit. The progress flags are private: they only
/// change through the transitions in `crate::progression`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSet {
  id: SetId,
  set_number: u32,
  reps: u32,
  /// Target load in kg, 0 for bodyweight
  weight: f64,
  #[serde(default, rename = "isCompleted")]
  pub(crate) completed: bool,
  #[serde(default, rename = "isSkipped")]
  pub(crate) skipped: bool,
  #[serde(default, rename = "isPr")]
  pub(crate) personal_record: bool,
}

impl WorkoutSet {
  pub fn new(id: SetId, set_number: u32, reps: u32, weight: f64) -> Self {
    Self {
      id,
      set_number,
      reps,
      weight,
      completed: false,
      skipped: false,
      personal_record: false,
    }
  }

  pub fn id(&self) -> SetId {
    self.id
  }

  pub fn set_number(&self) -> u32 {
    self.set_number
  }

  pub fn reps(&self) -> u32 {
    self.reps
  }

  pub fn weight(&self) -> f64 {
    self.weight
  }

  pub fn is_bodyweight(&self) -> bool {
    self.weight == 0.0
  }

  pub fn is_completed(&self) -> bool {
    self.completed
  }

  pub fn is_skipped(&self) -> bool {
    self.skipped
  }

  pub fn is_pr(&self) -> bool {
    self.personal_record
  }

  /// Completed or skipped
  pub fn is_handled(&self) -> bool {
    self.completed || self.skipped
  }

  /// Load moved by this set: reps x weight when completed, otherwise nothing
  pub fn volume(&self) -> f64 {
    if self.completed {
      self.reps as f64 * self.weight
    } else {
      0.0
    }
  }

  fn validate(&self) -> Result<(), ModelError> {
    if self.completed && self.skipped {
      return Err(ModelError::CompletedAndSkipped(self.id));
    }
    if self.skipped && self.personal_record {
      return Err(ModelError::SkippedPersonalRecord(self.id));
    }
    Ok(())
  }
}

/// ---------------------------------------------------------------------------
/// Exercise
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
  pub id: ExerciseId,
  pub name: String,
  #[serde(default)]
  pub description: String,
  sets: Vec<WorkoutSet>,
}

impl Exercise {
  /// Build an exercise, rejecting set lists whose ordinals are not strictly increasing
  pub fn new(
    id: ExerciseId,
    name: impl Into<String>,
    description: impl Into<String>,
    sets: Vec<WorkoutSet>,
  ) -> Result<Self, ModelError> {
    let exercise = Self {
      id,
      name: name.into(),
      description: description.into(),
      sets,
    };
    exercise.check_order()?;
    Ok(exercise)
  }

  pub fn sets(&self) -> &[WorkoutSet] {
    &self.sets
  }

  pub(crate) fn sets_mut(&mut self) -> &mut [WorkoutSet] {
    &mut self.sets
  }

  /// Every set completed or skipped; an exercise without sets is complete
  pub fn is_complete(&self) -> bool {
    self.sets.iter().all(WorkoutSet::is_handled)
  }

  pub fn contains_set(&self, set_id: SetId) -> bool {
    self.sets.iter().any(|s| s.id == set_id)
  }

  pub fn find_set(&self, set_id: SetId) -> Option<&WorkoutSet> {
    self.sets.iter().find(|s| s.id == set_id)
  }

  /// First set, in ordinal order, that is neither completed nor skipped
  pub fn first_incomplete_set(&self) -> Option<&WorkoutSet> {
    self.sets.iter().find(|s| !s.is_handled())
  }

  /// Alias used by the live mirror
  pub fn next_set(&self) -> Option<&WorkoutSet> {
    self.first_incomplete_set()
  }

  /// Last set, in ordinal order, that is completed or skipped
  pub fn last_handled_set(&self) -> Option<&WorkoutSet> {
    self.sets.iter().rev().find(|s| s.is_handled())
  }

  fn check_order(&self) -> Result<(), ModelError> {
    for pair in self.sets.windows(2) {
      if pair[1].set_number <= pair[0].set_number {
        return Err(ModelError::SetOrder {
          exercise_id: self.id,
          set_number: pair[1].set_number,
        });
      }
    }
    Ok(())
  }
}

/// ---------------------------------------------------------------------------
/// Group
/// ---------------------------------------------------------------------------

/// A named phase of a workout, e.g. "Warmup" or "Main Lift"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
  pub id: i64,
  pub name: String,
  #[serde(default)]
  pub expected_duration_min: u32,
  pub exercises: Vec<Exercise>,
}

impl Group {
  pub fn new(id: i64, name: impl Into<String>, exercises: Vec<Exercise>) -> Self {
    Self {
      id,
      name: name.into(),
      expected_duration_min: 0,
      exercises,
    }
  }

  pub fn with_expected_duration(mut self, minutes: u32) -> Self {
    self.expected_duration_min = minutes;
    self
  }

  pub fn is_complete(&self) -> bool {
    self.exercises.iter().all(Exercise::is_complete)
  }

  pub fn next_exercise(&self) -> Option<&Exercise> {
    self.exercises.iter().find(|e| !e.is_complete())
  }

  pub fn has_personal_record(&self) -> bool {
    self
      .exercises
      .iter()
      .any(|e| e.sets().iter().any(WorkoutSet::is_pr))
  }

  /// Reorder exercises inside the group; `to` is the final position
  pub fn move_exercise(&mut self, from: usize, to: usize) -> Result<(), ModelError> {
    move_item(&mut self.exercises, from, to)
  }
}

/// ---------------------------------------------------------------------------
/// Workout
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
  pub id: i64,
  pub name: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub(crate) start_time: Option<DateTime<Utc>>,
  #[serde(default)]
  pub(crate) end_time: Option<DateTime<Utc>>,
  /// Stored under `workout` by older documents
  #[serde(alias = "workout")]
  pub groups: Vec<Group>,
}

impl Workout {
  pub fn new(id: i64, name: impl Into<String>, groups: Vec<Group>) -> Self {
    Self {
      id,
      name: name.into(),
      description: String::new(),
      start_time: None,
      end_time: None,
      groups,
    }
  }

  pub fn start_time(&self) -> Option<DateTime<Utc>> {
    self.start_time
  }

  pub fn end_time(&self) -> Option<DateTime<Utc>> {
    self.end_time
  }

  pub fn is_complete(&self) -> bool {
    self.groups.iter().all(Group::is_complete)
  }

  /// All exercises in tree order (group order, then exercise order)
  pub fn exercises(&self) -> impl Iterator<Item = &Exercise> {
    self.groups.iter().flat_map(|g| g.exercises.iter())
  }

  /// All sets in tree order
  pub fn sets(&self) -> impl Iterator<Item = &WorkoutSet> {
    self.exercises().flat_map(|e| e.sets().iter())
  }

  /// First exercise in tree order that is not yet complete
  pub fn next_exercise(&self) -> Option<&Exercise> {
    self.groups.iter().find_map(Group::next_exercise)
  }

  /// The exercise that owns the given set
  pub fn find_exercise(&self, set_id: SetId) -> Option<&Exercise> {
    self.exercises().find(|e| e.contains_set(set_id))
  }

  pub fn exercise(&self, exercise_id: ExerciseId) -> Option<&Exercise> {
    self.exercises().find(|e| e.id == exercise_id)
  }

  pub fn find_set(&self, set_id: SetId) -> Option<&WorkoutSet> {
    self.sets().find(|s| s.id() == set_id)
  }

  fn exercises_mut(&mut self) -> impl Iterator<Item = &mut Exercise> {
    self.groups.iter_mut().flat_map(|g| g.exercises.iter_mut())
  }

  pub(crate) fn exercise_mut(&mut self, exercise_id: ExerciseId) -> Option<&mut Exercise> {
    self.exercises_mut().find(|e| e.id == exercise_id)
  }

  /// Mutable handle on the exercise that owns the given set
  pub(crate) fn find_exercise_mut(&mut self, set_id: SetId) -> Option<&mut Exercise> {
    self.exercises_mut().find(|e| e.contains_set(set_id))
  }

  /// Check a loaded document against the model invariants
  pub fn validate(&self) -> Result<(), ModelError> {
    let mut seen_exercises = HashSet::new();
    let mut seen_sets = HashSet::new();
    for exercise in self.exercises() {
      if !seen_exercises.insert(exercise.id) {
        return Err(ModelError::DuplicateExerciseId(exercise.id));
      }
      exercise.check_order()?;
      for set in exercise.sets() {
        set.validate()?;
        if !seen_sets.insert(set.id()) {
          return Err(ModelError::DuplicateSetId(set.id()));
        }
      }
    }
    Ok(())
  }
}
