//! Response envelope shared by handlers, hooks and the error translator.
//!
//! # Responsibilities
//! - Hold the numeric status set by handlers
//! - Hold a structured body until the format hook serializes it
//! - Convert into an axum response at the edge
//!
//! # Design Decisions
//! - Handlers never serialize; the required format hook does it once
//! - Unknown status codes are served as 500 rather than dropped

use axum::body::{Body, Bytes};
use axum::http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use serde_json::Value;

use crate::errors::Fault;

pub const APPLICATION_JSON: &str = "application/json";

#[derive(Debug, Clone, Default, PartialEq)]
pub enum ResponseBody {
    #[default]
    Empty,
    /// Structured body not yet serialized.
    Json(Value),
    /// Wire bytes.
    Raw(Bytes),
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// Numeric status as set by the handler.
    pub status: u16,
    /// Protocol status line, written by the format hook (`"200 OK"`).
    pub status_line: Option<String>,
    pub headers: HeaderMap,
    pub body: ResponseBody,
}

impl Default for ApiResponse {
    fn default() -> Self {
        Self {
            status: 200,
            status_line: None,
            headers: HeaderMap::new(),
            body: ResponseBody::Empty,
        }
    }
}

impl ApiResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: ResponseBody::Json(body),
            ..Self::default()
        }
    }

    pub fn fault(fault: &Fault) -> Self {
        Self::json(fault.status(), fault.to_body())
    }

    /// Set status and structured body in one step.
    pub fn set_json(&mut self, status: u16, body: Value) {
        self.status = status;
        self.body = ResponseBody::Json(body);
    }

    pub fn set_fault(&mut self, fault: &Fault) {
        self.set_json(fault.status(), fault.to_body());
    }

    pub fn set_header(&mut self, name: &str, value: &str) {
        match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => tracing::warn!(header = %name, "Dropping invalid response header"),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header(CONTENT_TYPE.as_str())
    }

    /// The structured body, if it has not been serialized yet.
    pub fn json_body(&self) -> Option<&Value> {
        match &self.body {
            ResponseBody::Json(value) => Some(value),
            _ => None,
        }
    }

    /// The serialized body, if the format hook already ran.
    pub fn raw_body(&self) -> Option<&Bytes> {
        match &self.body {
            ResponseBody::Raw(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Convert into the host server's response type.
    pub fn into_http(self) -> Response {
        let status = self.status_code();
        let mut headers = self.headers;
        let body = match self.body {
            ResponseBody::Empty => Body::empty(),
            ResponseBody::Raw(bytes) => Body::from(bytes),
            ResponseBody::Json(value) => {
                headers
                    .entry(CONTENT_TYPE)
                    .or_insert(HeaderValue::from_static(APPLICATION_JSON));
                Body::from(value.to_string())
            }
        };

        let mut response = Response::new(body);
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }
}

/// `"200 OK"` for known codes, the bare number otherwise.
pub fn status_line(code: u16) -> String {
    match StatusCode::from_u16(code).ok().and_then(|s| s.canonical_reason()) {
        Some(reason) => format!("{code} {reason}"),
        None => code.to_string(),
    }
}
