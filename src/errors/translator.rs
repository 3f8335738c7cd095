//! Error translation.
//!
//! # Responsibilities
//! - Hold the ordered (kind, handler) registrations
//! - Resolve the handler for a raised error
//! - Run the after-hook chain on the generated fault response
//!
//! # Resolution
//! 1. Only registrations whose kind is the error's kind or one of its
//!    ancestors are candidates.
//! 2. The candidate with the fewest parent hops wins (exact kind first,
//!    then the nearest ancestor).
//! 3. Ties go to the most recently registered handler.
//!
//! The built-in `Any` handler is always registered, so every error resolves.

use std::cmp::Reverse;
use std::sync::Arc;

use crate::errors::faults;
use crate::errors::{ApiError, ErrorKind};
use crate::hooks::AfterChain;
use crate::http::{ApiResponse, PathParams, RequestContext};
use crate::observability::metrics;

/// Signature shared by built-in and externally registered error handlers.
pub type ErrorHandlerFn =
    dyn Fn(&ApiError, &RequestContext, &PathParams) -> ApiResponse + Send + Sync;

#[derive(Clone)]
struct Registration {
    kind: ErrorKind,
    name: String,
    handler: Arc<ErrorHandlerFn>,
    seq: u64,
}

/// Ordered error handler registrations.
#[derive(Clone, Default)]
pub struct ErrorHandlers {
    entries: Vec<Registration>,
    next_seq: u64,
}

impl ErrorHandlers {
    /// An empty registration list.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-ins, anchored generic to specific.
    pub fn builtin() -> Self {
        let mut handlers = Self::new();
        handlers.add(ErrorKind::Any, "unexpected", handle_unexpected_error);
        handlers.add(ErrorKind::Validation, "schema_validation", handle_validation_error);
        handlers.add(ErrorKind::Response, "response_exception", handle_response_exception);
        handlers.add(ErrorKind::Authentication, "authentication", handle_authentication_error);
        handlers
    }

    /// Register a handler. Returns `false` when a handler with the same
    /// kind and name is already present.
    pub fn add<F>(&mut self, kind: ErrorKind, name: impl Into<String>, handler: F) -> bool
    where
        F: Fn(&ApiError, &RequestContext, &PathParams) -> ApiResponse + Send + Sync + 'static,
    {
        self.add_shared(kind, name, Arc::new(handler))
    }

    pub fn add_shared(
        &mut self,
        kind: ErrorKind,
        name: impl Into<String>,
        handler: Arc<ErrorHandlerFn>,
    ) -> bool {
        let name = name.into();
        if self.contains(kind, &name) {
            return false;
        }
        tracing::debug!(kind = %kind, handler = %name, "Adding error handler");
        self.entries.push(Registration {
            kind,
            name,
            handler,
            seq: self.next_seq,
        });
        self.next_seq += 1;
        true
    }

    /// Append every registration of `other`, keeping its relative order.
    pub fn extend(&mut self, other: &ErrorHandlers) {
        for entry in &other.entries {
            self.add_shared(entry.kind, entry.name.clone(), entry.handler.clone());
        }
    }

    pub fn contains(&self, kind: ErrorKind, name: &str) -> bool {
        self.entries.iter().any(|e| e.kind == kind && e.name == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Name of the handler that would serve an error of `kind`.
    pub fn resolve_name(&self, kind: ErrorKind) -> Option<&str> {
        self.resolve(kind).map(|r| r.name.as_str())
    }

    fn resolve(&self, kind: ErrorKind) -> Option<&Registration> {
        self.entries
            .iter()
            .filter_map(|entry| kind.distance_to(entry.kind).map(|d| (d, entry)))
            .min_by_key(|(distance, entry)| (*distance, Reverse(entry.seq)))
            .map(|(_, entry)| entry)
    }
}

/// Converts raised errors into fault responses.
#[derive(Clone)]
pub struct ErrorTranslator {
    handlers: ErrorHandlers,
    after: AfterChain,
}

impl ErrorTranslator {
    pub fn new(handlers: ErrorHandlers, after: AfterChain) -> Self {
        Self { handlers, after }
    }

    /// Produce the final response for `error`. Never fails.
    pub fn handle(
        &self,
        error: &ApiError,
        req: &RequestContext,
        params: &PathParams,
    ) -> ApiResponse {
        let response = match self.handlers.resolve(error.kind()) {
            Some(registration) => {
                tracing::debug!(
                    request_id = req.request_id().unwrap_or("-"),
                    kind = %error.kind(),
                    handler = %registration.name,
                    "Translating error"
                );
                (registration.handler)(error, req, params)
            }
            None => handle_unexpected_error(error, req, params),
        };
        metrics::record_fault(error.kind(), response.status);
        self.after.apply(req, response)
    }
}

/// Logs the internal detail; the client only sees a generic 503.
pub fn handle_unexpected_error(
    error: &ApiError,
    req: &RequestContext,
    _params: &PathParams,
) -> ApiResponse {
    tracing::error!(
        request_id = req.request_id().unwrap_or("-"),
        method = %req.method(),
        path = %req.path(),
        kind = %error.kind(),
        error = ?error,
        "Unexpected error"
    );
    ApiResponse::fault(&faults::service_unavailable())
}

pub fn handle_validation_error(
    error: &ApiError,
    _req: &RequestContext,
    _params: &PathParams,
) -> ApiResponse {
    let fault = faults::bad_request("Invalid request body").with_description(error.to_string());
    ApiResponse::fault(&fault)
}

pub fn handle_response_exception(
    error: &ApiError,
    req: &RequestContext,
    params: &PathParams,
) -> ApiResponse {
    match error {
        ApiError::Response(exc) => ApiResponse::json(exc.status, exc.body.clone()),
        other => handle_unexpected_error(other, req, params),
    }
}

pub fn handle_authentication_error(
    error: &ApiError,
    req: &RequestContext,
    _params: &PathParams,
) -> ApiResponse {
    tracing::info!(
        request_id = req.request_id().unwrap_or("-"),
        method = %req.method(),
        path = %req.path(),
        reason = %error,
        "Authentication failed"
    );
    ApiResponse::fault(&faults::unauthorized(error.to_string()))
}
