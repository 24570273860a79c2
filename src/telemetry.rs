//! Tracing setup for host applications.

use crate::config::Config;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

/// Install a global fmt subscriber filtered by `config.log_filter`.
///
/// Returns false if a global subscriber was already installed (by the host
/// or an earlier call); the existing one is left in place.
pub fn init_tracing(config: &Config) -> bool {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse_lossy(&config.log_filter);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}
