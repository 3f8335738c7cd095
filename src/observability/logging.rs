//! Structured logging.
//!
//! # Responsibilities
//! - Initialize logging subsystem
//! - Configure log level from config or environment
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - `RUST_LOG` wins over the configured level when set

use tracing_subscriber::EnvFilter;

pub type InitError = Box<dyn std::error::Error + Send + Sync>;

/// Build the filter: `RUST_LOG` if set, otherwise `log_level`.
pub fn env_filter(log_level: &str) -> Result<EnvFilter, InitError> {
    if std::env::var("RUST_LOG").is_ok() {
        return Ok(EnvFilter::from_default_env());
    }
    EnvFilter::try_new(log_level)
        .map_err(|e| format!("invalid log level filter '{log_level}': {e}").into())
}

/// Install the global subscriber.
pub fn init_tracing(log_level: &str) -> Result<(), InitError> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(log_level)?)
        .with_target(true)
        .try_init()
}
