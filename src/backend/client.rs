//! Per-request backend API client.
//!
//! # Responsibilities
//! - Carry the credentials of one request
//! - Issue `POST {endpoint}/{service}/{method}.json` calls
//! - Turn backend faults into `BackendError`
//!
//! # Design Decisions
//! - The connection pool (`reqwest::Client`) is shared; the handle is not
//! - A handle is built per request and never cached

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use crate::backend::BackendError;
use crate::errors::ApiError;
use crate::hooks::BeforeHook;
use crate::http::{PathParams, RequestContext, X_AUTH_TOKEN};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub token: String,
}

#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    endpoint: Arc<Url>,
    credentials: Option<Credentials>,
}

#[derive(Debug, Deserialize)]
struct FaultBody {
    #[serde(default)]
    code: Option<String>,
    error: String,
}

impl BackendClient {
    pub fn new(http: reqwest::Client, endpoint: Arc<Url>, credentials: Option<Credentials>) -> Self {
        Self {
            http,
            endpoint,
            credentials,
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn method_url(&self, service: &str, method: &str) -> String {
        format!(
            "{}/{}/{}.json",
            self.endpoint.as_str().trim_end_matches('/'),
            service,
            method
        )
    }

    /// Invoke `service.method` with positional `parameters`.
    pub async fn call(&self, service: &str, method: &str, parameters: Vec<Value>) -> Result<Value, BackendError> {
        let url = self.method_url(service, method);
        let mut request = self.http.post(&url).json(&json!({ "parameters": parameters }));
        if let Some(creds) = &self.credentials {
            request = request.basic_auth(&creds.username, Some(&creds.token));
        }

        tracing::debug!(service = %service, method = %method, "Calling backend");
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if status.is_success() {
            return serde_json::from_slice(&body)
                .map_err(|e| BackendError::transport(format!("unreadable backend response: {e}")));
        }
        Err(parse_fault(status.as_u16(), &body))
    }
}

fn parse_fault(status: u16, body: &[u8]) -> BackendError {
    match serde_json::from_slice::<FaultBody>(body) {
        Ok(fault) => BackendError::new(
            fault.code.unwrap_or_else(|| format!("HTTP_{status}")),
            fault.error,
        ),
        Err(_) => BackendError::transport(format!("backend answered HTTP {status}")),
    }
}

/// Before-hook that gives every request a fresh backend client.
pub struct AttachBackendClient {
    http: reqwest::Client,
    endpoint: Arc<Url>,
}

impl AttachBackendClient {
    pub const NAME: &'static str = "attach_backend_client";

    pub fn new(http: reqwest::Client, endpoint: Url) -> Self {
        Self {
            http,
            endpoint: Arc::new(endpoint),
        }
    }
}

impl BeforeHook for AttachBackendClient {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn before(&self, req: &mut RequestContext, _params: &PathParams) -> Result<(), ApiError> {
        let credentials = match (req.auth(), req.header(X_AUTH_TOKEN)) {
            (Some(auth), Some(token)) => Some(Credentials {
                username: auth.username.clone(),
                token: token.to_string(),
            }),
            _ => None,
        };
        if req.tenant_id().is_none() {
            let tenant_id = req.auth().map(|auth| auth.tenant_id.clone());
            req.set_tenant_id(tenant_id);
        }
        req.insert_extension(BackendClient::new(
            self.http.clone(),
            self.endpoint.clone(),
            credentials,
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthToken;
    use axum::http::Method;

    fn hook() -> AttachBackendClient {
        AttachBackendClient::new(
            reqwest::Client::new(),
            Url::parse("https://api.example.com/rest/v3/").unwrap(),
        )
    }

    #[test]
    fn test_method_url() {
        let client = BackendClient::new(
            reqwest::Client::new(),
            Arc::new(Url::parse("https://api.example.com/rest/v3/").unwrap()),
            None,
        );
        assert_eq!(
            client.method_url("Account", "getVirtualGuests"),
            "https://api.example.com/rest/v3/Account/getVirtualGuests.json"
        );
    }

    #[test]
    fn test_anonymous_client() {
        let mut req = RequestContext::new(Method::GET, "/");
        hook().before(&mut req, &PathParams::new()).unwrap();
        let client = req.extension::<BackendClient>().unwrap();
        assert!(client.credentials().is_none());
        assert_eq!(req.tenant_id(), None);
    }

    #[test]
    fn test_client_carries_request_credentials() {
        let mut req = RequestContext::new(Method::GET, "/").with_header("X-Auth-Token", "tok");
        req.set_auth(AuthToken::new("1234567", "test-sl", "123456"));
        hook().before(&mut req, &PathParams::new()).unwrap();

        let client = req.extension::<BackendClient>().unwrap();
        assert_eq!(
            client.credentials(),
            Some(&Credentials {
                username: "test-sl".into(),
                token: "tok".into()
            })
        );
        assert_eq!(req.tenant_id(), Some("123456"));
    }

    #[test]
    fn test_parse_fault() {
        let err = parse_fault(404, br#"{"error":"Object not found","code":"SoftLayer_Exception_ObjectNotFound"}"#);
        assert_eq!(err.fault_code, "SoftLayer_Exception_ObjectNotFound");
        assert_eq!(err.fault_string, "Object not found");

        let err = parse_fault(500, br#"{"error":"boom"}"#);
        assert_eq!(err.fault_code, "HTTP_500");

        let err = parse_fault(502, b"<html>");
        assert_eq!(err.fault_code, crate::backend::error::TRANSPORT_FAULT);
    }
}
