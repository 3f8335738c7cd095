//! Authentication collaborators used by the auth hooks.
//!
//! # Data Flow
//! ```text
//! X-Auth-Token header
//!     → hooks::auth_token (decides whether a token is required)
//!     → identity.rs (TokenValidator → AuthToken)
//!     → RequestContext::set_auth
//!
//! config reload
//!     → settings.rs (AuthSettings rebuilt)
//!     → ArcSwap store, seen by the next request
//! ```

pub mod identity;
pub mod settings;

pub use identity::{AuthToken, TokenStore, TokenValidator};
pub use settings::{
    follow_updates, shared_settings, AuthSettings, SharedAuthSettings, DEFAULT_NO_AUTH_ROUTES,
};
