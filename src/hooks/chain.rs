//! Frozen hook chains executed per request.

use std::sync::Arc;

use crate::errors::ApiError;
use crate::hooks::{AfterHook, BeforeHook};
use crate::http::{ApiResponse, PathParams, RequestContext};

/// Before-hooks in execution order. The first error stops the chain.
#[derive(Clone, Default)]
pub struct BeforeChain {
    hooks: Vec<Arc<dyn BeforeHook>>,
}

impl BeforeChain {
    pub fn new(hooks: Vec<Arc<dyn BeforeHook>>) -> Self {
        Self { hooks }
    }

    pub fn run(&self, req: &mut RequestContext, params: &PathParams) -> Result<(), ApiError> {
        for hook in &self.hooks {
            if let Err(err) = hook.before(req, params) {
                tracing::debug!(
                    request_id = req.request_id().unwrap_or("-"),
                    hook = %hook.name(),
                    error = %err,
                    "Before hook rejected request"
                );
                return Err(err);
            }
        }
        Ok(())
    }

    pub fn names(&self) -> Vec<&str> {
        self.hooks.iter().map(|h| h.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

/// After-hooks in execution order. Runs on success and fault responses alike.
#[derive(Clone, Default)]
pub struct AfterChain {
    hooks: Vec<Arc<dyn AfterHook>>,
}

impl AfterChain {
    pub fn new(hooks: Vec<Arc<dyn AfterHook>>) -> Self {
        Self { hooks }
    }

    pub fn apply(&self, req: &RequestContext, resp: ApiResponse) -> ApiResponse {
        self.hooks.iter().fold(resp, |resp, hook| hook.after(req, resp))
    }

    pub fn names(&self) -> Vec<&str> {
        self.hooks.iter().map(|h| h.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}
