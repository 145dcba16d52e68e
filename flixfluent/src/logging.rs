//! Logging setup

use crate::GlobalConfig;
use flixfluent_core::{PlayerError, PlayerResult};
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise the level is `debug` with
/// [`GlobalConfig::debug_logging`] and `info` without.
pub fn init_logging(config: &GlobalConfig) -> PlayerResult<()> {
    let default_level = if config.debug_logging { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| PlayerError::Initialization {
            reason: format!("Failed to install log subscriber: {}", e),
        })
}
