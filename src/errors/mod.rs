//! Error taxonomy and fault translation.
//!
//! # Data Flow
//! ```text
//! before-hook / handler returns Err(ApiError)
//!     → kind.rs (classify into the ErrorKind hierarchy)
//!     → translator.rs (pick the closest registered handler)
//!     → faults.rs (build the OpenStack fault envelope)
//!     → after-hooks run on the fault response
//! ```
//!
//! # Design Decisions
//! - One error enum for everything a request can raise
//! - Classification is explicit (`ErrorKind::parent`), never by insertion order
//! - Unclassified errors never leak their text to the client

pub mod faults;
pub mod kind;
pub mod translator;

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::backend::BackendError;
use crate::routing::RoutingError;

pub use faults::Fault;
pub use kind::ErrorKind;
pub use translator::{ErrorHandlerFn, ErrorHandlers, ErrorTranslator};

/// Every error that can terminate a request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body is malformed or does not conform to its schema.
    #[error("{0}")]
    Validation(String),

    /// Intentional error raised by a handler, rendered as-is.
    #[error("response exception with status {}", .0.status)]
    Response(ResponseException),

    /// No usable credentials on a protected route.
    #[error("{0}")]
    Unauthorized(String),

    /// Credentials were presented but rejected.
    #[error("{0}")]
    InvalidToken(String),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Internal(Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
    /// Position of this error in the kind hierarchy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Validation(_) => ErrorKind::Validation,
            ApiError::Response(_) => ErrorKind::Response,
            ApiError::Unauthorized(_) => ErrorKind::Unauthorized,
            ApiError::InvalidToken(_) => ErrorKind::InvalidToken,
            ApiError::Backend(_) => ErrorKind::Backend,
            ApiError::Routing(e) => e.kind(),
            ApiError::Timeout(_) => ErrorKind::Timeout,
            ApiError::Internal(_) => ErrorKind::Any,
        }
    }

    /// Wrap any foreign error as unclassified.
    pub fn internal<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        ApiError::Internal(error.into())
    }
}

impl From<Fault> for ApiError {
    fn from(fault: Fault) -> Self {
        ApiError::Response(ResponseException::from(fault))
    }
}

/// A structured error that carries its own status and body.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseException {
    pub status: u16,
    pub body: Value,
}

impl ResponseException {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }
}

impl From<Fault> for ResponseException {
    fn from(fault: Fault) -> Self {
        Self {
            status: fault.status(),
            body: fault.to_body(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(ApiError::Validation("bad".into()).kind(), ErrorKind::Validation);
        assert_eq!(ApiError::Unauthorized("no".into()).kind(), ErrorKind::Unauthorized);
        assert_eq!(ApiError::InvalidToken("no".into()).kind(), ErrorKind::InvalidToken);
        assert_eq!(ApiError::Timeout(Duration::from_secs(1)).kind(), ErrorKind::Timeout);
        assert_eq!(ApiError::internal("boom").kind(), ErrorKind::Any);

        let missing = ApiError::from(RoutingError::MissingParameter {
            endpoint: "v2_server".into(),
            param: "server_id".into(),
        });
        assert_eq!(missing.kind(), ErrorKind::MissingParameter);
    }

    #[test]
    fn test_fault_becomes_response_exception() {
        let err = ApiError::from(faults::not_found("Server could not be found"));
        match err {
            ApiError::Response(exc) => {
                assert_eq!(exc.status, 404);
                assert_eq!(exc.body["notFound"]["code"], "404");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
