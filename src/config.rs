use std::env;

/// ---------------------------------------------------------------------------
/// Configuration Constants
/// ---------------------------------------------------------------------------

const DEFAULT_DATABASE_URL: &str = "sqlite://fit-log.db?mode=rwc";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_LOG_FILTER: &str = "info";

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
  #[error("Invalid value for {name}: {value}")]
  InvalidValue { name: String, value: String },
}

/// ---------------------------------------------------------------------------
/// App Configuration
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
  pub database_url: String,
  pub max_connections: u32,
  pub log_filter: String,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      database_url: DEFAULT_DATABASE_URL.to_string(),
      max_connections: DEFAULT_MAX_CONNECTIONS,
      log_filter: DEFAULT_LOG_FILTER.to_string(),
    }
  }
}

impl AppConfig {
  /// Read configuration from the environment. Call `dotenvy::dotenv()` first
  /// to pick up a local `.env` file.
  pub fn from_env() -> Result<Self, ConfigError> {
    let defaults = Self::default();

    let max_connections = match env::var("FIT_LOG_MAX_CONNECTIONS") {
      Ok(raw) => match raw.trim().parse::<u32>() {
        Ok(n) if n > 0 => n,
        _ => {
          return Err(ConfigError::InvalidValue {
            name: "FIT_LOG_MAX_CONNECTIONS".into(),
            value: raw,
          })
        }
      },
      Err(_) => defaults.max_connections,
    };

    Ok(Self {
      database_url: env::var("FIT_LOG_DATABASE_URL").unwrap_or(defaults.database_url),
      max_connections,
      log_filter: env::var("FIT_LOG_LOG").unwrap_or(defaults.log_filter),
    })
  }
}
