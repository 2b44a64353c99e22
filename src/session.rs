//! Workout session lifecycle: clock stamps and replay reset

use chrono::{DateTime, Duration, Utc};

use crate::models::Workout;
use crate::progression::{ProgressionError, ProgressionEvent};

impl Workout {
    pub fn is_started(&self) -> bool {
        self.start_time.is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.end_time.is_some()
    }

    pub fn start_session(&mut self, now: DateTime<Utc>) -> Result<ProgressionEvent, ProgressionError> {
        if self.start_time.is_some() {
            return Err(ProgressionError::SessionAlreadyStarted(self.id));
        }
        self.start_time = Some(now);
        self.end_time = None;
        tracing::info!(workout_id = self.id, started_at = %now, "workout session started");
        Ok(ProgressionEvent::SessionStarted)
    }

    pub fn end_session(&mut self, now: DateTime<Utc>) -> Result<ProgressionEvent, ProgressionError> {
        if self.start_time.is_none() {
            return Err(ProgressionError::SessionNotStarted(self.id));
        }
        if self.end_time.is_some() {
            return Err(ProgressionError::SessionAlreadyEnded(self.id));
        }
        self.end_time = Some(now);
        tracing::info!(workout_id = self.id, ended_at = %now, "workout session ended");
        Ok(ProgressionEvent::SessionEnded)
    }

    /// Time on the clock: up to `end_time` once finished, otherwise up to `now`
    pub fn elapsed(&self, now: DateTime<Utc>) -> Option<Duration> {
        let start = self.start_time?;
        let end = self.end_time.unwrap_or(now);
        Some((end - start).max(Duration::zero()))
    }

    /// Put the workout back into its authored state so it can be performed again.
    ///
    /// Completed and skipped flags plus both timestamps are cleared. Personal
    /// record markers stay as history.
    pub fn reset_for_replay(&mut self) {
        for group in self.groups.iter_mut() {
            for exercise in group.exercises.iter_mut() {
                for set in exercise.sets_mut() {
                    set.completed = false;
                    set.skipped = false;
                }
            }
        }
        self.start_time = None;
        self.end_time = None;
        tracing::debug!(workout_id = self.id, "workout reset for replay");
    }
}

/// Clock display, `MM:SS` with minutes wrapping at the hour
pub fn format_elapsed(elapsed: Duration) -> String {
    let total_seconds = elapsed.num_seconds().max(0);
    let seconds = total_seconds % 60;
    let minutes = (total_seconds / 60) % 60;
    format!("{:02}:{:02}", minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn test_start_and_end_session() {
        let mut workout = sample_workout();
        let start = fixed_time();

        assert_eq!(workout.start_session(start), Ok(ProgressionEvent::SessionStarted));
        assert!(workout.is_started());
        assert_eq!(
            workout.start_session(start),
            Err(ProgressionError::SessionAlreadyStarted(workout.id))
        );

        let end = start + Duration::minutes(42);
        assert_eq!(workout.end_session(end), Ok(ProgressionEvent::SessionEnded));
        assert!(workout.is_finished());
        assert_eq!(workout.elapsed(end + Duration::hours(1)), Some(Duration::minutes(42)));
        assert_eq!(
            workout.end_session(end),
            Err(ProgressionError::SessionAlreadyEnded(workout.id))
        );
    }

    #[test]
    fn test_end_without_start_fails() {
        let mut workout = sample_workout();
        assert_eq!(
            workout.end_session(fixed_time()),
            Err(ProgressionError::SessionNotStarted(workout.id))
        );
        assert_eq!(workout.elapsed(fixed_time()), None);
    }

    #[test]
    fn test_elapsed_runs_until_now() {
        let mut workout = sample_workout();
        let start = fixed_time();
        workout.start_session(start).unwrap();

        assert_eq!(
            workout.elapsed(start + Duration::seconds(95)),
            Some(Duration::seconds(95))
        );
    }

    #[test]
    fn test_reset_clears_session_flags_but_keeps_pr() {
        let mut workout = single_exercise_workout(&[(1, 5, 100.0), (2, 5, 100.0), (3, 5, 100.0)]);
        workout.start_session(fixed_time()).unwrap();
        workout.advance(1, false).unwrap();
        workout.advance(1, true).unwrap();
        workout.mark_personal_record(1).unwrap();
        workout.end_session(fixed_time() + Duration::minutes(30)).unwrap();

        workout.reset_for_replay();

        assert!(workout.sets().all(|s| !s.is_completed() && !s.is_skipped()));
        assert!(workout.find_set(1).unwrap().is_pr());
        assert!(workout.start_time().is_none());
        assert!(workout.end_time().is_none());
        assert!(workout.validate().is_ok());
        assert_eq!(workout.next_exercise().map(|e| e.id), Some(1));
    }

    #[test]
    fn test_replayed_pr_set_can_be_completed_again() {
        let mut workout = single_exercise_workout(&[(1, 5, 100.0)]);
        workout.advance(1, false).unwrap();
        workout.mark_personal_record(1).unwrap();
        workout.reset_for_replay();

        workout.advance(1, false).unwrap();

        let set = workout.find_set(1).unwrap();
        assert!(set.is_completed());
        assert!(set.is_pr());
    }

    #[test]
    fn test_skipping_replayed_pr_set_drops_marker() {
        let mut workout = single_exercise_workout(&[(1, 5, 100.0)]);
        workout.advance(1, false).unwrap();
        workout.mark_personal_record(1).unwrap();
        workout.reset_for_replay();

        workout.advance(1, true).unwrap();

        assert!(!workout.find_set(1).unwrap().is_pr());
        assert!(workout.validate().is_ok());
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::seconds(0)), "00:00");
        assert_eq!(format_elapsed(Duration::seconds(65)), "01:05");
        assert_eq!(format_elapsed(Duration::seconds(59 * 60 + 59)), "59:59");
        // Minutes wrap at the hour
        assert_eq!(format_elapsed(Duration::seconds(3600 + 125)), "02:05");
    }
}
