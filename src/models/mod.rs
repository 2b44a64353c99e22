pub mod workout;
pub mod plan;

pub use workout::{Exercise, ExerciseId, Group, ModelError, SetId, Workout, WorkoutSet};
pub use plan::{TrainingPlan, Week};
