/// Logging setup
use env_logger::{Builder, Env};

/// Initialize the global logger. `RUST_LOG` takes precedence; otherwise
/// `info`, or `warn` when quiet. Safe to call more than once.
pub fn init_log(quiet: bool) {
  let default = if quiet { "warn" } else { "info" };
  let _ = Builder::from_env(Env::default().default_filter_or(default))
    .format_timestamp(None)
    .try_init();
}

/// Logger for tests: captured output, all levels
pub fn init_test_log() {
  let _ = Builder::new()
    .filter_level(log::LevelFilter::Trace)
    .is_test(true)
    .try_init();
}
