use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber.
///
/// `RUST_LOG` wins over the configured filter when set. Calling this twice
/// is harmless; the second install is ignored.
pub fn init_tracing(default_filter: &str) {
  let filter = EnvFilter::try_from_default_env()
    .or_else(|_| EnvFilter::try_new(default_filter))
    .unwrap_or_else(|_| EnvFilter::new("info"));

  let installed = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(true)
    .try_init()
    .is_ok();

  if installed {
    tracing::debug!(filter = default_filter, "tracing initialized");
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_init_tracing_twice_is_harmless() {
    init_tracing("debug");
    init_tracing("not a [valid filter");
    tracing::info!("still logging");
  }
}
