//! Logger setup
//!
//! The crate logs through the `log` facade. Applications that do not bring
//! their own logger can install `env_logger` here; `RUST_LOG` still wins over
//! the configured default level.

use crate::config::LoggingConfig;

/// Install `env_logger` with the configured default filter
///
/// Safe to call more than once: later calls are no-ops.
pub fn init_logging(config: &LoggingConfig) {
    let env = env_logger::Env::default().default_filter_or(config.level.as_str());
    let result = env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .format_module_path(config.module_path)
        .try_init();

    if result.is_ok() {
        log::debug!("logging initialized at {}", config.level);
    }
}
