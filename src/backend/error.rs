//! Faults raised by the backend cloud API.

use thiserror::Error;

use crate::errors::{faults, translator, ApiError};
use crate::http::{ApiResponse, PathParams, RequestContext};

/// Fault code used when the backend could not be reached or answered
/// something unreadable.
pub const TRANSPORT_FAULT: &str = "Backend_Exception_Transport";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{fault_code}: {fault_string}")]
pub struct BackendError {
    pub fault_code: String,
    pub fault_string: String,
}

impl BackendError {
    pub fn new(fault_code: impl Into<String>, fault_string: impl Into<String>) -> Self {
        Self {
            fault_code: fault_code.into(),
            fault_string: fault_string.into(),
        }
    }

    pub fn transport(detail: impl Into<String>) -> Self {
        Self::new(TRANSPORT_FAULT, detail)
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return Self::transport("Backend request timed out");
        }
        Self::transport(e.to_string())
    }
}

/// Error handler registered for `ErrorKind::Backend`.
pub fn handle_backend_error(
    error: &ApiError,
    req: &RequestContext,
    params: &PathParams,
) -> ApiResponse {
    let ApiError::Backend(e) = error else {
        return translator::handle_unexpected_error(error, req, params);
    };

    tracing::warn!(
        request_id = req.request_id().unwrap_or("-"),
        fault_code = %e.fault_code,
        "Backend fault"
    );
    let fault = if e.fault_code.ends_with("ObjectNotFound") {
        faults::not_found(&e.fault_string)
    } else if e.fault_code.ends_with("InvalidValue") || e.fault_code.ends_with("InvalidArgument") {
        faults::bad_request(&e.fault_string)
    } else {
        faults::compute_fault(&e.fault_string, None)
    };
    ApiResponse::fault(&fault)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;

    fn translate(code: &str, message: &str) -> ApiResponse {
        handle_backend_error(
            &ApiError::from(BackendError::new(code, message)),
            &RequestContext::new(Method::GET, "/"),
            &PathParams::new(),
        )
    }

    #[test]
    fn test_not_found() {
        let resp = translate("SoftLayer_Exception_ObjectNotFound", "Unable to find object");
        assert_eq!(resp.status, 404);
        assert_eq!(
            resp.json_body().map(|b| b["notFound"]["message"].clone()),
            Some("Unable to find object".into())
        );
    }

    #[test]
    fn test_invalid_argument() {
        assert_eq!(translate("SoftLayer_Exception_InvalidValue", "bad").status, 400);
        assert_eq!(translate("SoftLayer_Exception_Public_InvalidArgument", "bad").status, 400);
    }

    #[test]
    fn test_everything_else_is_compute_fault() {
        let resp = translate("SoftLayer_Exception_Public", "quota exceeded");
        assert_eq!(resp.status, 500);
        let body = resp.json_body().cloned().unwrap_or_default();
        assert_eq!(body["computeFault"]["message"], "quota exceeded");
        assert_eq!(body["computeFault"]["code"], "500");
    }
}
