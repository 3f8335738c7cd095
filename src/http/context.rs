//! Per-request state.
//!
//! # Responsibilities
//! - Carry the inbound request (method, path, headers, body)
//! - Carry state produced by before-hooks (request id, tenant, auth)
//! - Carry opaque collaborator handles (backend client) as typed extensions
//!
//! # Design Decisions
//! - Exactly one context per inbound request, owned by the pipeline run
//! - Never shared across requests, so no interior locking

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use axum::body::Bytes;
use axum::http::header::{HeaderName, HeaderValue, HOST};
use axum::http::request::Parts;
use axum::http::{Extensions, HeaderMap, Method};
use serde_json::Value;

use crate::auth::AuthToken;
use crate::errors::ApiError;
use crate::http::schema::BodySchema;
use crate::routing::{RoutingError, ServiceDirectory};

/// Set by an upstream layer that already authenticated the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteUser(pub String);

/// Path parameters bound from the matched URL template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(BTreeMap<String, String>);

impl PathParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PathParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl fmt::Display for PathParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// Mutable state threaded through before-hooks, the handler and after-hooks.
pub struct RequestContext {
    method: Method,
    path: String,
    query: Option<String>,
    headers: HeaderMap,
    body: Bytes,
    scheme: String,
    host: String,
    script_root: String,

    request_id: Option<String>,
    tenant_id: Option<String>,
    auth: Option<AuthToken>,
    is_admin: bool,
    remote_user: Option<String>,

    extensions: Extensions,
    directory: Option<Arc<ServiceDirectory>>,
}

impl RequestContext {
    /// Build a context from a method and a path with optional query string.
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string())),
            None => (target.to_string(), None),
        };
        Self {
            method,
            path: if path.is_empty() { "/".to_string() } else { path },
            query,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            scheme: "http".to_string(),
            host: "localhost".to_string(),
            script_root: String::new(),
            request_id: None,
            tenant_id: None,
            auth: None,
            is_admin: false,
            remote_user: None,
            extensions: Extensions::new(),
            directory: None,
        }
    }

    /// Build a context from an inbound HTTP request.
    pub fn from_parts(parts: &Parts, body: Bytes, fallback_host: &str) -> Self {
        let target = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let mut ctx = Self::new(parts.method.clone(), target);
        ctx.headers = parts.headers.clone();
        ctx.body = body;

        ctx.scheme = parts
            .uri
            .scheme_str()
            .or_else(|| header_str(&parts.headers, "x-forwarded-proto"))
            .unwrap_or("http")
            .to_string();
        ctx.host = header_str(&parts.headers, HOST.as_str())
            .or_else(|| parts.uri.authority().map(|a| a.as_str()))
            .unwrap_or(fallback_host)
            .to_string();

        if let Some(RemoteUser(user)) = parts.extensions.get::<RemoteUser>() {
            ctx.remote_user = Some(user.clone());
        }
        ctx
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => tracing::warn!(header = %name, "Ignoring invalid header"),
        }
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Path prefix under which the whole application is served.
    pub fn with_script_root(mut self, root: impl Into<String>) -> Self {
        self.script_root = root.into();
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Header value as text; non-UTF-8 values read as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        header_str(&self.headers, name)
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn script_root(&self) -> &str {
        &self.script_root
    }

    /// `scheme://host/script_root`, the base of every absolute link.
    pub fn base_url(&self) -> String {
        format!("{}://{}{}", self.scheme, self.host, self.script_root)
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    pub fn set_request_id(&mut self, id: impl Into<String>) {
        self.request_id = Some(id.into());
    }

    pub fn tenant_id(&self) -> Option<&str> {
        self.tenant_id.as_deref()
    }

    pub fn set_tenant_id(&mut self, tenant_id: Option<String>) {
        self.tenant_id = tenant_id;
    }

    pub fn auth(&self) -> Option<&AuthToken> {
        self.auth.as_ref()
    }

    pub fn set_auth(&mut self, token: AuthToken) {
        self.auth = Some(token);
    }

    /// User id of the validated token.
    pub fn user_id(&self) -> Option<&str> {
        self.auth.as_ref().map(|t| t.user_id.as_str())
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub fn set_admin(&mut self, is_admin: bool) {
        self.is_admin = is_admin;
    }

    pub fn remote_user(&self) -> Option<&str> {
        self.remote_user.as_deref()
    }

    pub fn set_remote_user(&mut self, user: impl Into<String>) {
        self.remote_user = Some(user.into());
    }

    /// True when something upstream of the auth hook already vouched for
    /// the caller.
    pub fn is_preauthenticated(&self) -> bool {
        self.remote_user.is_some() || self.is_admin || self.auth.is_some()
    }

    pub fn insert_extension<T: Clone + Send + Sync + 'static>(&mut self, value: T) {
        self.extensions.insert(value);
    }

    pub fn extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions.get::<T>()
    }

    /// Parse the body as JSON.
    pub fn json_body(&self) -> Result<Value, ApiError> {
        serde_json::from_slice(&self.body)
            .map_err(|_| ApiError::Validation("Malformed request body".to_string()))
    }

    /// Parse the body as JSON and check it against `schema`.
    pub fn validated_json(&self, schema: &BodySchema) -> Result<Value, ApiError> {
        let body = self.json_body()?;
        schema.validate(&body)?;
        Ok(body)
    }

    pub(crate) fn attach_directory(&mut self, directory: Arc<ServiceDirectory>) {
        self.directory = Some(directory);
    }

    /// Absolute URL of a named endpoint of `service`, for self links.
    pub fn endpoint_url(
        &self,
        service: &str,
        endpoint: &str,
        params: &PathParams,
    ) -> Result<String, RoutingError> {
        match &self.directory {
            Some(directory) => directory.endpoint_url(service, self, endpoint, params),
            None => Err(RoutingError::UnknownService(service.to_string())),
        }
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("query", &self.query)
            .field("request_id", &self.request_id)
            .field("tenant_id", &self.tenant_id)
            .field("is_admin", &self.is_admin)
            .field("remote_user", &self.remote_user)
            .finish_non_exhaustive()
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
