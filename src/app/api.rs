//! The assembled request pipeline.
//!
//! # Responsibilities
//! - Match the request path to a compiled route (or the fallback)
//! - Run the before chain, the handler and the after chain in order
//! - Funnel every error into the translator
//! - Bound handler execution by the request timeout
//! - Record request metrics

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::errors::{ApiError, ErrorTranslator};
use crate::hooks::{AfterChain, BeforeChain};
use crate::http::{ApiResponse, PathParams, RequestContext, Resource};
use crate::observability::metrics;
use crate::routing::{RouteSet, ServiceDirectory, UrlTemplate};

/// Metrics label for requests that fell through to the default route.
const UNROUTED: &str = "none";

pub struct Api {
    /// Required before-hooks alone, for requests answered without routing.
    required_before: BeforeChain,
    before: BeforeChain,
    after: AfterChain,
    routes: RouteSet,
    default_route: Arc<dyn Resource>,
    translator: ErrorTranslator,
    directory: Arc<ServiceDirectory>,
    request_timeout: Duration,
}

impl Api {
    pub(crate) fn new(
        required_before: BeforeChain,
        before: BeforeChain,
        after: AfterChain,
        routes: RouteSet,
        default_route: Arc<dyn Resource>,
        translator: ErrorTranslator,
        directory: Arc<ServiceDirectory>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            required_before,
            before,
            after,
            routes,
            default_route,
            translator,
            directory,
            request_timeout,
        }
    }

    /// Serve one request. Always produces a response.
    pub async fn handle(&self, mut req: RequestContext) -> ApiResponse {
        let start = Instant::now();
        req.attach_directory(self.directory.clone());

        let (service, handler, params) = match self.routes.match_path(req.path()) {
            Some(m) => (m.service.to_string(), m.handler, m.params),
            None => (
                UNROUTED.to_string(),
                self.default_route.clone(),
                PathParams::new(),
            ),
        };

        let response = match self.invoke(&mut req, handler.as_ref(), &params).await {
            Ok(response) => self.after.apply(&req, response),
            Err(err) => self.translator.handle(&err, &req, &params),
        };

        metrics::record_request(req.method().as_str(), response.status, &service, start);
        response
    }

    /// Answer with `err` without running any handler. Used by the HTTP shell
    /// for failures before a context exists (unreadable body). Only the
    /// required before-hooks run, so the fault still carries a request id.
    pub fn reject(&self, mut req: RequestContext, err: ApiError) -> ApiResponse {
        let start = Instant::now();
        req.attach_directory(self.directory.clone());
        let params = PathParams::new();
        if let Err(hook_err) = self.required_before.run(&mut req, &params) {
            tracing::warn!(error = %hook_err, "Required hook failed on rejected request");
        }
        let response = self.translator.handle(&err, &req, &params);
        metrics::record_request(req.method().as_str(), response.status, UNROUTED, start);
        response
    }

    async fn invoke(
        &self,
        req: &mut RequestContext,
        handler: &dyn Resource,
        params: &PathParams,
    ) -> Result<ApiResponse, ApiError> {
        self.before.run(req, params)?;

        let req: &RequestContext = req;
        let mut response = ApiResponse::new();
        match tokio::time::timeout(self.request_timeout, handler.handle(req, &mut response, params))
            .await
        {
            Ok(result) => result.map(|()| response),
            Err(_) => Err(ApiError::Timeout(self.request_timeout)),
        }
    }

    /// Number of compiled routes, `.json` aliases included.
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// (service, endpoint, pattern) of every compiled route.
    pub fn routes(&self) -> impl Iterator<Item = (&str, &str, &UrlTemplate)> {
        self.routes.patterns()
    }

    pub fn before_hook_names(&self) -> Vec<&str> {
        self.before.names()
    }

    pub fn after_hook_names(&self) -> Vec<&str> {
        self.after.names()
    }

    pub fn directory(&self) -> &Arc<ServiceDirectory> {
        &self.directory
    }
}

impl std::fmt::Debug for Api {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Api")
            .field("routes", &self.routes.len())
            .field("before", &self.before.names())
            .field("after", &self.after.names())
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}
