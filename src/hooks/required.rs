//! The `core` hook module: always loaded, never optional.
//!
//! - `set_request_id` stamps `req-<uuid>` into the context
//! - `format` serializes the body, sets the content type and status line,
//!   and echoes the request id

use std::sync::Arc;

use axum::body::Bytes;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::hooks::{AfterHook, BeforeHook, HookDeps, HookSet};
use crate::http::{
    status_line, ApiResponse, PathParams, RequestContext, ResponseBody, APPLICATION_JSON,
    X_COMPUTE_REQUEST_ID,
};

pub const MODULE: &str = "core";

pub fn install(hooks: &mut HookSet, _deps: &HookDeps) {
    hooks.add_before_hook(Arc::new(SetRequestId), false);
    hooks.add_after_hook(Arc::new(FormatResponse), false);
}

pub fn generate_request_id() -> String {
    format!("req-{}", Uuid::new_v4())
}

#[derive(Debug, Default)]
pub struct SetRequestId;

impl BeforeHook for SetRequestId {
    fn name(&self) -> &str {
        "set_request_id"
    }

    fn before(&self, req: &mut RequestContext, _params: &PathParams) -> Result<(), ApiError> {
        if req.request_id().is_none() {
            req.set_request_id(generate_request_id());
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct FormatResponse;

impl AfterHook for FormatResponse {
    fn name(&self) -> &str {
        "format"
    }

    fn after(&self, req: &RequestContext, mut resp: ApiResponse) -> ApiResponse {
        if let ResponseBody::Json(value) = &resp.body {
            let bytes = Bytes::from(value.to_string());
            resp.body = ResponseBody::Raw(bytes);
            resp.set_header("content-type", APPLICATION_JSON);
        }
        resp.status_line = Some(status_line(resp.status));
        if let Some(id) = req.request_id() {
            resp.set_header(X_COMPUTE_REQUEST_ID, id);
        }
        resp
    }
}
