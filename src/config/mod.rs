//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ShimConfig (validated, immutable)
//!     → shared via Arc with the app composition
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → auth::follow_updates swaps the auth settings
//! ```
//!
//! # Design Decisions
//! - Routes, hooks and error handlers are frozen at startup
//! - Only the auth section is applied live
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AuthConfig, BackendConfig, HooksConfig, ListenerConfig, ObservabilityConfig, SecurityConfig,
    ServiceConfig, ShimConfig, TimeoutConfig,
};
pub use validation::{validate_config, ValidationError};
pub use watcher::ConfigWatcher;
