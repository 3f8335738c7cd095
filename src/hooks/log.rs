//! The `log` hook module: one line per request and per response.

use std::sync::Arc;

use crate::errors::ApiError;
use crate::hooks::{AfterHook, BeforeHook, HookDeps, HookSet};
use crate::http::{ApiResponse, PathParams, RequestContext};

pub const MODULE: &str = "log";

pub fn install(hooks: &mut HookSet, _deps: &HookDeps) {
    hooks.add_before_hook(Arc::new(LogRequest), true);
    hooks.add_after_hook(Arc::new(LogResponse), true);
}

#[derive(Debug, Default)]
pub struct LogRequest;

impl BeforeHook for LogRequest {
    fn name(&self) -> &str {
        "log_request"
    }

    fn before(&self, req: &mut RequestContext, params: &PathParams) -> Result<(), ApiError> {
        tracing::info!(
            "REQ: {} {} {} {} [ReqId: {}]",
            req.method(),
            req.path(),
            req.query().unwrap_or(""),
            params,
            req.request_id().unwrap_or("-")
        );
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct LogResponse;

impl AfterHook for LogResponse {
    fn name(&self) -> &str {
        "log_response"
    }

    fn after(&self, req: &RequestContext, resp: ApiResponse) -> ApiResponse {
        let status = resp
            .status_line
            .clone()
            .unwrap_or_else(|| resp.status.to_string());
        tracing::info!(
            "RESP: {} {} {} {} [ReqId: {}]",
            req.method(),
            req.path(),
            req.query().unwrap_or(""),
            status,
            req.request_id().unwrap_or("-")
        );
        resp
    }
}
