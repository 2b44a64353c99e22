//! Set Progression Engine
//!
//! Every set moves through a small state machine:
//! - pending -> completed (complete)
//! - pending -> skipped (skip)
//! - completed | skipped -> pending (undo)
//!
//! Key rules:
//! - Forward progress always lands on the earliest pending set of an exercise
//! - Backward progress always undoes the most recently handled set
//! - The engine never touches clocks; session effects come back as events

use serde::{Deserialize, Serialize};

use crate::models::{Exercise, ExerciseId, SetId, Workout, WorkoutSet};

// ---------------------------------------------------------------------------
/// Set Status: Where a single set is in the session
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum SetStatus {
    #[default]
    Pending,
    Completed,
    Skipped,
}

impl std::fmt::Display for SetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Completed => write!(f, "completed"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

impl std::str::FromStr for SetStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "skipped" => Ok(Self::Skipped),
            _ => Err(format!("Unknown set status: {}", s)),
        }
    }
}

// ---------------------------------------------------------------------------
/// Set Action: The mutations a caller can request
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetAction {
    Complete,
    Skip,
    Undo,
    MarkPersonalRecord,
}

impl std::fmt::Display for SetAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Complete => write!(f, "complete"),
            Self::Skip => write!(f, "skip"),
            Self::Undo => write!(f, "undo"),
            Self::MarkPersonalRecord => write!(f, "mark_personal_record"),
        }
    }
}

// ---------------------------------------------------------------------------
/// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProgressionError {
    /// A caller asked for a transition the set's current state does not allow
    #[error("Cannot {action} set {set_id}: set is {from}")]
    InvalidTransition {
        set_id: SetId,
        from: SetStatus,
        action: SetAction,
    },

    #[error("Set not found: {0}")]
    SetNotFound(SetId),

    #[error("Exercise not found: {0}")]
    ExerciseNotFound(ExerciseId),

    #[error("Workout {0} has already been started")]
    SessionAlreadyStarted(i64),

    #[error("Workout {0} has not been started")]
    SessionNotStarted(i64),

    #[error("Workout {0} has already been finished")]
    SessionAlreadyEnded(i64),
}

// ---------------------------------------------------------------------------
/// Set Transitions
// ---------------------------------------------------------------------------

impl WorkoutSet {
    pub fn status(&self) -> SetStatus {
        if self.completed {
            SetStatus::Completed
        } else if self.skipped {
            SetStatus::Skipped
        } else {
            SetStatus::Pending
        }
    }

    fn invalid(&self, action: SetAction) -> ProgressionError {
        ProgressionError::InvalidTransition {
            set_id: self.id(),
            from: self.status(),
            action,
        }
    }

    pub fn mark_complete(&mut self) -> Result<(), ProgressionError> {
        if self.status() != SetStatus::Pending {
            return Err(self.invalid(SetAction::Complete));
        }
        self.completed = true;
        Ok(())
    }

    /// Skipping drops any PR marker carried over from an earlier run
    pub fn mark_skipped(&mut self) -> Result<(), ProgressionError> {
        if self.status() != SetStatus::Pending {
            return Err(self.invalid(SetAction::Skip));
        }
        self.skipped = true;
        self.personal_record = false;
        Ok(())
    }

    pub fn undo(&mut self) -> Result<(), ProgressionError> {
        if self.status() == SetStatus::Pending {
            return Err(self.invalid(SetAction::Undo));
        }
        self.completed = false;
        self.skipped = false;
        self.personal_record = false;
        Ok(())
    }

    pub fn mark_personal_record(&mut self) -> Result<(), ProgressionError> {
        if self.status() != SetStatus::Completed {
            return Err(self.invalid(SetAction::MarkPersonalRecord));
        }
        self.personal_record = true;
        Ok(())
    }

    fn apply(&mut self, action: SetAction) -> Result<(), ProgressionError> {
        match action {
            SetAction::Complete => self.mark_complete(),
            SetAction::Skip => self.mark_skipped(),
            SetAction::Undo => self.undo(),
            SetAction::MarkPersonalRecord => self.mark_personal_record(),
        }
    }
}

/// What a single mutation did to a single set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetTransition {
    pub exercise_id: ExerciseId,
    pub set_id: SetId,
    pub action: SetAction,
    pub from: SetStatus,
    pub to: SetStatus,
}

// ---------------------------------------------------------------------------
/// Exercise Cascade
// ---------------------------------------------------------------------------

impl Exercise {
    /// Canonical progress step for one exercise.
    ///
    /// Completes (or skips) the earliest pending set, whichever set the user
    /// touched. Once nothing is pending the step undoes the last handled set
    /// instead. Returns `None` for an exercise without sets.
    pub fn advance(&mut self, skip: bool) -> Result<Option<SetTransition>, ProgressionError> {
        let (set_id, action) = if let Some(set) = self.first_incomplete_set() {
            let action = if skip { SetAction::Skip } else { SetAction::Complete };
            (set.id(), action)
        } else if let Some(set) = self.last_handled_set() {
            (set.id(), SetAction::Undo)
        } else {
            return Ok(None);
        };

        self.apply_to_set(set_id, action).map(Some)
    }

    fn apply_to_set(
        &mut self,
        set_id: SetId,
        action: SetAction,
    ) -> Result<SetTransition, ProgressionError> {
        let exercise_id = self.id;
        let set = self
            .sets_mut()
            .iter_mut()
            .find(|s| s.id() == set_id)
            .ok_or(ProgressionError::SetNotFound(set_id))?;

        let from = set.status();
        set.apply(action)?;
        let to = set.status();

        tracing::debug!(exercise_id, set_id, %action, %from, %to, "set transition");

        Ok(SetTransition {
            exercise_id,
            set_id,
            action,
            from,
            to,
        })
    }
}

// ---------------------------------------------------------------------------
/// Session Events & Live Snapshot
// ---------------------------------------------------------------------------

/// Side effects the caller is expected to act on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressionEvent {
    /// A set changed while the workout clock was not running
    SessionStarted,
    /// The workout clock was stopped
    SessionEnded,
    /// The last pending set of the workout was handled
    WorkoutCompleted,
}

/// What a lock-screen style mirror needs to show the upcoming set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveSnapshot {
    pub workout_name: String,
    pub exercise_id: ExerciseId,
    pub exercise_name: String,
    pub set_id: SetId,
    pub set_number: u32,
    pub reps: u32,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvanceOutcome {
    pub transition: Option<SetTransition>,
    pub events: Vec<ProgressionEvent>,
    pub snapshot: Option<LiveSnapshot>,
}

impl AdvanceOutcome {
    pub fn starts_session(&self) -> bool {
        self.events.contains(&ProgressionEvent::SessionStarted)
    }
}

// ---------------------------------------------------------------------------
/// Workout Entry Points
// ---------------------------------------------------------------------------

impl Workout {
    /// Snapshot of the next pending set, `None` once the workout is complete
    pub fn live_snapshot(&self) -> Option<LiveSnapshot> {
        let exercise = self.next_exercise()?;
        let set = exercise.next_set()?;
        Some(LiveSnapshot {
            workout_name: self.name.clone(),
            exercise_id: exercise.id,
            exercise_name: exercise.name.clone(),
            set_id: set.id(),
            set_number: set.set_number(),
            reps: set.reps(),
            weight: set.weight(),
        })
    }

    /// Run the cascade on one exercise of this workout
    pub fn advance(
        &mut self,
        exercise_id: ExerciseId,
        skip: bool,
    ) -> Result<AdvanceOutcome, ProgressionError> {
        let was_complete = self.is_complete();
        let exercise = self
            .exercise_mut(exercise_id)
            .ok_or(ProgressionError::ExerciseNotFound(exercise_id))?;
        let transition = exercise.advance(skip)?;
        Ok(self.outcome(transition, was_complete))
    }

    /// Handle a tap on a specific set.
    ///
    /// A tap on a pending set moves the exercise forward (earliest pending set
    /// first). A tap on an already handled set undoes the last handled one.
    pub fn activate_set(
        &mut self,
        set_id: SetId,
        skip: bool,
    ) -> Result<AdvanceOutcome, ProgressionError> {
        let exercise = self
            .find_exercise(set_id)
            .ok_or(ProgressionError::SetNotFound(set_id))?;
        let tapped_pending = exercise
            .find_set(set_id)
            .is_some_and(|s| !s.is_handled());

        let target = if tapped_pending {
            exercise.first_incomplete_set().map(|s| {
                let action = if skip { SetAction::Skip } else { SetAction::Complete };
                (s.id(), action)
            })
        } else {
            exercise.last_handled_set().map(|s| (s.id(), SetAction::Undo))
        };

        match target {
            Some((target_id, action)) => self.apply(target_id, action),
            None => Ok(self.outcome(None, self.is_complete())),
        }
    }

    /// Complete the next pending set of the workout, as the lock-screen button does
    pub fn complete_next_set(&mut self) -> Result<AdvanceOutcome, ProgressionError> {
        match self.live_snapshot().map(|s| s.set_id) {
            Some(set_id) => self.apply(set_id, SetAction::Complete),
            None => Ok(self.outcome(None, true)),
        }
    }

    pub fn undo_set(&mut self, set_id: SetId) -> Result<AdvanceOutcome, ProgressionError> {
        self.apply(set_id, SetAction::Undo)
    }

    pub fn mark_personal_record(
        &mut self,
        set_id: SetId,
    ) -> Result<AdvanceOutcome, ProgressionError> {
        self.apply(set_id, SetAction::MarkPersonalRecord)
    }

    /// Apply one action to a set, resolving the owning exercise from the set id
    fn apply(&mut self, set_id: SetId, action: SetAction) -> Result<AdvanceOutcome, ProgressionError> {
        let was_complete = self.is_complete();
        let exercise = self
            .find_exercise_mut(set_id)
            .ok_or(ProgressionError::SetNotFound(set_id))?;
        let transition = exercise.apply_to_set(set_id, action)?;
        Ok(self.outcome(Some(transition), was_complete))
    }

    fn outcome(&self, transition: Option<SetTransition>, was_complete: bool) -> AdvanceOutcome {
        let mut events = Vec::new();
        if transition.is_some() {
            if self.start_time.is_none() {
                events.push(ProgressionEvent::SessionStarted);
            }
            if !was_complete && self.is_complete() {
                events.push(ProgressionEvent::WorkoutCompleted);
            }
        }

        AdvanceOutcome {
            transition,
            events,
            snapshot: self.live_snapshot(),
        }
    }
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------
