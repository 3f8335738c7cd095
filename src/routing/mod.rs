//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     service declarations
//!     → table.rs (RouteTable: endpoint name → URL template, per mount)
//!     → dispatcher.rs (bind handlers to declared endpoints)
//!     → router.rs (RouteSet: compiled patterns + `.json` aliases)
//!     → directory.rs (frozen RouteTables for link resolution)
//!
//! Per request:
//!     path → RouteSet::match_path → handler + PathParams
//!     handler → RequestContext::endpoint_url → ServiceDirectory → absolute URL
//! ```
//!
//! # Design Decisions
//! - Routes are declared before drivers supply handlers (two-phase binding)
//! - Re-declaring a name with the same template is a no-op; with a
//!   different template it is rejected
//! - Immutable after startup (read without locks)
//! - Deterministic: more literal segments win, then declaration order

pub mod directory;
pub mod dispatcher;
pub mod matcher;
pub mod router;
pub mod table;

use thiserror::Error;

use crate::errors::ErrorKind;

pub use directory::ServiceDirectory;
pub use dispatcher::{Dispatcher, Route};
pub use matcher::UrlTemplate;
pub use router::{RouteMatch, RouteSet};
pub use table::RouteTable;

/// Errors raised while declaring routes or resolving URLs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    #[error("unknown service '{0}'")]
    UnknownService(String),

    #[error("unknown endpoint '{0}'")]
    UnknownEndpoint(String),

    #[error("endpoint '{endpoint}' requires parameter '{param}'")]
    MissingParameter { endpoint: String, param: String },

    #[error("endpoint '{name}' is already declared as '{existing}', refusing '{requested}'")]
    DuplicateEndpoint {
        name: String,
        existing: String,
        requested: String,
    },

    #[error("invalid url template '{template}': {reason}")]
    InvalidTemplate { template: String, reason: String },
}

impl RoutingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RoutingError::UnknownService(_) => ErrorKind::UnknownService,
            RoutingError::UnknownEndpoint(_) => ErrorKind::UnknownEndpoint,
            RoutingError::MissingParameter { .. } => ErrorKind::MissingParameter,
            RoutingError::DuplicateEndpoint { .. } => ErrorKind::DuplicateEndpoint,
            RoutingError::InvalidTemplate { .. } => ErrorKind::InvalidTemplate,
        }
    }
}
