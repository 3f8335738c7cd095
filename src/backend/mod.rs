//! Backend cloud API collaborator.
//!
//! # Data Flow
//! ```text
//! before-hook attach_backend_client
//!     → client.rs (fresh BackendClient with the request's credentials)
//!     → RequestContext extension
//!     → resource handler: BackendClient::call
//!     → BackendError on fault
//!     → error.rs (handle_backend_error → notFound / badRequest / computeFault)
//! ```
//!
//! # Design Decisions
//! - The backend is a black box, only invoked
//! - Fault text is forwarded; transport detail stays in the logs

pub mod client;
pub mod error;

use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::app::{App, LoadError};
use crate::errors::ErrorKind;

pub use client::{AttachBackendClient, BackendClient, Credentials};
pub use error::{handle_backend_error, BackendError};

/// Name of the backend error handler registration.
pub const ERROR_HANDLER: &str = "backend_error";

/// Install the client hook and the backend error handler on `app`. Safe to
/// call once per driver; repeated installs are ignored.
pub fn install(app: &mut App) -> Result<(), LoadError> {
    let config = &app.config().backend;
    let endpoint = Url::parse(&config.endpoint)
        .map_err(|e| LoadError::Backend(format!("invalid endpoint '{}': {e}", config.endpoint)))?;
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| LoadError::Backend(e.to_string()))?;

    app.add_before_hook(Arc::new(AttachBackendClient::new(http, endpoint)));
    app.add_error_handler(ErrorKind::Backend, ERROR_HANDLER, handle_backend_error);
    Ok(())
}
