//! OpenStack fault envelopes.
//!
//! Wire shape:
//! ```text
//! {"<faultKey>": {"message": "...", "code": "<status>", ["details": "..."]}}
//! ```
//! The status is mirrored as the HTTP status and as the `code` string.

use serde_json::{Map, Value};

/// An immutable fault body plus the status it is served with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    key: String,
    status: u16,
    message: String,
    details: Option<String>,
    description: Option<String>,
}

impl Fault {
    pub fn new(key: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            status,
            message: message.into(),
            details: None,
            description: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Render the JSON body.
    pub fn to_body(&self) -> Value {
        let mut inner = Map::new();
        inner.insert("message".into(), Value::String(self.message.clone()));
        inner.insert("code".into(), Value::String(self.status.to_string()));
        if let Some(details) = &self.details {
            inner.insert("details".into(), Value::String(details.clone()));
        }
        if let Some(description) = &self.description {
            inner.insert("description".into(), Value::String(description.clone()));
        }

        let mut outer = Map::new();
        outer.insert(self.key.clone(), Value::Object(inner));
        Value::Object(outer)
    }
}

pub fn bad_request(message: impl Into<String>) -> Fault {
    Fault::new("badRequest", 400, message)
}

pub fn unauthorized(message: impl Into<String>) -> Fault {
    Fault::new("unauthorized", 401, message)
}

pub fn not_found(message: impl Into<String>) -> Fault {
    Fault::new("notFound", 404, message)
}

pub fn bad_method(method: &str) -> Fault {
    Fault::new("badMethod", 405, format!("Method {method} is not allowed"))
}

pub fn duplicate(message: impl Into<String>) -> Fault {
    Fault::new("conflictingRequest", 409, message)
}

pub fn over_limit(message: impl Into<String>) -> Fault {
    Fault::new("overLimit", 413, message)
}

/// Compute-service fault, 500 unless the caller says otherwise.
pub fn compute_fault(message: impl Into<String>, status: Option<u16>) -> Fault {
    Fault::new("computeFault", status.unwrap_or(500), message)
}

/// Volume-service fault, 500 unless the caller says otherwise.
pub fn volume_fault(message: impl Into<String>, status: Option<u16>) -> Fault {
    Fault::new("volumeFault", status.unwrap_or(500), message)
}

pub fn not_implemented() -> Fault {
    Fault::new("notImplemented", 501, "Not Implemented").with_details("Not Implemented")
}

/// The only body ever shown for unclassified errors.
pub fn service_unavailable() -> Fault {
    compute_fault("Service Unavailable", Some(503)).with_details("Service Unavailable")
}
