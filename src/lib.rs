pub mod analysis;
pub mod commands;
pub mod config;
pub mod db;
pub mod logging;
pub mod models;
pub mod progression;
pub mod session;

#[cfg(test)]
mod test_utils;

pub use analysis::{SetCounts, WorkoutRecap};
pub use config::{AppConfig, ConfigError};
pub use db::{AppState, StoreError};
pub use models::{Exercise, Group, ModelError, TrainingPlan, Week, Workout, WorkoutSet};
pub use progression::{
  AdvanceOutcome, LiveSnapshot, ProgressionError, ProgressionEvent, SetAction, SetStatus,
  SetTransition,
};
pub use session::format_elapsed;

#[derive(Debug, thiserror::Error)]
pub enum BootError {
  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error(transparent)]
  Store(#[from] StoreError),
}

/// Load `.env`, read configuration, install logging and open the database
pub async fn bootstrap() -> Result<AppState, BootError> {
  // Load environment variables from .env file
  dotenvy::dotenv().ok();

  let config = AppConfig::from_env()?;
  logging::init_tracing(&config.log_filter);

  let pool = match db::initialize_db(&config).await {
    Ok(pool) => pool,
    Err(e) => {
      tracing::error!(error = %e, "failed to initialize database");
      return Err(e.into());
    }
  };

  tracing::info!("database ready");
  Ok(AppState { db: pool })
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;

  #[tokio::test]
  #[serial]
  async fn test_bootstrap_with_memory_database() {
    let state = temp_env::async_with_vars(
      [
        ("FIT_LOG_DATABASE_URL", Some("sqlite::memory:")),
        ("FIT_LOG_MAX_CONNECTIONS", Some("1")),
      ],
      bootstrap(),
    )
    .await
    .expect("Should bootstrap");

    assert!(commands::get_workouts(&state).await.unwrap().is_empty());
    state.db.close().await;
  }

  #[tokio::test]
  #[serial]
  async fn test_bootstrap_rejects_bad_config() {
    let result = temp_env::async_with_vars(
      [("FIT_LOG_MAX_CONNECTIONS", Some("many"))],
      bootstrap(),
    )
    .await;

    assert!(matches!(result, Err(BootError::Config(_))));
  }
}
