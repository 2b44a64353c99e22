//! Read-only workout reporting
//!
//! Everything here is recomputed from the tree on each call:
//! - completion percentage for progress bars
//! - total weight lifted and PR counts for the recap screen
//! - names of exercises still to do

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Workout, WorkoutSet};
use crate::progression::SetStatus;
use crate::session::format_elapsed;

/// ---------------------------------------------------------------------------
/// Aggregation Queries
/// ---------------------------------------------------------------------------

impl Workout {
    /// `(handled + 1) / (total + 1)`, or 0 for a workout without sets.
    ///
    /// The +1 on both sides keeps a fresh workout above 0% and reaches 100%
    /// exactly when every set is handled.
    pub fn completed_percent(&self) -> f64 {
        let counts = SetCounts::of(self);
        if counts.total == 0 {
            return 0.0;
        }
        (counts.handled() + 1) as f64 / (counts.total + 1) as f64
    }

    /// Sum of reps x weight over completed sets; skipped sets lift nothing
    pub fn total_weight_lifted(&self) -> f64 {
        self.sets().map(WorkoutSet::volume).sum()
    }

    /// Number of groups holding at least one PR set
    pub fn new_pr_count(&self) -> usize {
        self.groups.iter().filter(|g| g.has_personal_record()).count()
    }

    /// Names of every exercise that is not complete yet, in tree order.
    /// The exercise currently in progress is included.
    pub fn upcoming_exercise_names(&self) -> Vec<String> {
        self.exercises()
            .filter(|e| !e.is_complete())
            .map(|e| e.name.clone())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetCounts {
    pub total: usize,
    pub completed: usize,
    pub skipped: usize,
}

impl SetCounts {
    pub fn of(workout: &Workout) -> Self {
        workout.sets().fold(Self::default(), |mut acc, set| {
            acc.total += 1;
            match set.status() {
                SetStatus::Completed => acc.completed += 1,
                SetStatus::Skipped => acc.skipped += 1,
                SetStatus::Pending => {}
            }
            acc
        })
    }

    pub fn handled(&self) -> usize {
        self.completed + self.skipped
    }
}

/// ---------------------------------------------------------------------------
/// Recap
/// ---------------------------------------------------------------------------

/// One row of the recap list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetRecapLine {
    pub exercise_name: String,
    pub set_number: u32,
    pub status: SetStatus,
    pub personal_record: bool,
    pub label: String,
}

impl SetRecapLine {
    fn from_set(exercise_name: &str, set: &WorkoutSet) -> Self {
        let label = if set.is_bodyweight() {
            format!("{}. {} reps", set.set_number(), set.reps())
        } else {
            format!("{}. {} x {} kg", set.set_number(), set.reps(), set.weight())
        };

        Self {
            exercise_name: exercise_name.to_string(),
            set_number: set.set_number(),
            status: set.status(),
            personal_record: set.is_pr(),
            label,
        }
    }
}

/// Summary shown once a workout is finished
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutRecap {
    pub workout_id: i64,
    pub name: String,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_seconds: Option<i64>,
    pub duration_display: Option<String>,
    pub sets: SetCounts,
    pub completed_percent: f64,
    pub total_weight_lifted: f64,
    pub new_pr_count: usize,
    pub lines: Vec<SetRecapLine>,
}

impl WorkoutRecap {
    pub fn compute(workout: &Workout) -> Self {
        let duration: Option<Duration> = match (workout.start_time(), workout.end_time()) {
            (Some(start), Some(end)) => Some((end - start).max(Duration::zero())),
            _ => None,
        };

        let lines = workout
            .exercises()
            .flat_map(|e| e.sets().iter().map(|s| SetRecapLine::from_set(&e.name, s)))
            .collect();

        Self {
            workout_id: workout.id,
            name: workout.name.clone(),
            started_at: workout.start_time(),
            ended_at: workout.end_time(),
            duration_seconds: duration.map(|d| d.num_seconds()),
            duration_display: duration.map(format_elapsed),
            sets: SetCounts::of(workout),
            completed_percent: workout.completed_percent(),
            total_weight_lifted: workout.total_weight_lifted(),
            new_pr_count: workout.new_pr_count(),
            lines,
        }
    }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
