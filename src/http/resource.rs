//! Handler contract for routed endpoints.
//!
//! A resource implements any subset of `on_get`, `on_post`, `on_put` and
//! `on_delete`. Each verb receives the request context, the response to fill
//! in and the bound path parameters, and either sets status/body or returns
//! an error for the translator.

use async_trait::async_trait;
use axum::http::Method;

use crate::errors::{faults, ApiError};
use crate::http::{ApiResponse, PathParams, RequestContext};

#[async_trait]
pub trait Resource: Send + Sync {
    async fn on_get(
        &self,
        req: &RequestContext,
        _resp: &mut ApiResponse,
        _params: &PathParams,
    ) -> Result<(), ApiError> {
        Err(method_not_allowed(req))
    }

    async fn on_post(
        &self,
        req: &RequestContext,
        _resp: &mut ApiResponse,
        _params: &PathParams,
    ) -> Result<(), ApiError> {
        Err(method_not_allowed(req))
    }

    async fn on_put(
        &self,
        req: &RequestContext,
        _resp: &mut ApiResponse,
        _params: &PathParams,
    ) -> Result<(), ApiError> {
        Err(method_not_allowed(req))
    }

    async fn on_delete(
        &self,
        req: &RequestContext,
        _resp: &mut ApiResponse,
        _params: &PathParams,
    ) -> Result<(), ApiError> {
        Err(method_not_allowed(req))
    }

    /// Dispatch on the request method. HEAD is served by `on_get`.
    async fn handle(
        &self,
        req: &RequestContext,
        resp: &mut ApiResponse,
        params: &PathParams,
    ) -> Result<(), ApiError> {
        match *req.method() {
            Method::GET | Method::HEAD => self.on_get(req, resp, params).await,
            Method::POST => self.on_post(req, resp, params).await,
            Method::PUT => self.on_put(req, resp, params).await,
            Method::DELETE => self.on_delete(req, resp, params).await,
            _ => Err(method_not_allowed(req)),
        }
    }
}

fn method_not_allowed(req: &RequestContext) -> ApiError {
    faults::bad_method(req.method().as_str()).into()
}

/// Fallback for every path without a bound handler.
#[derive(Debug, Default, Clone, Copy)]
pub struct NotImplemented;

#[async_trait]
impl Resource for NotImplemented {
    async fn handle(
        &self,
        _req: &RequestContext,
        resp: &mut ApiResponse,
        _params: &PathParams,
    ) -> Result<(), ApiError> {
        resp.set_fault(&faults::not_implemented());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct GetOnly;

    #[async_trait]
    impl Resource for GetOnly {
        async fn on_get(
            &self,
            _req: &RequestContext,
            resp: &mut ApiResponse,
            _params: &PathParams,
        ) -> Result<(), ApiError> {
            resp.set_json(200, json!({"ok": true}));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_dispatch_by_method() {
        let mut resp = ApiResponse::new();
        let req = RequestContext::new(Method::HEAD, "/");
        GetOnly.handle(&req, &mut resp, &PathParams::new()).await.unwrap();
        assert_eq!(resp.json_body(), Some(&json!({"ok": true})));
    }

    #[tokio::test]
    async fn test_missing_verb_is_405() {
        let mut resp = ApiResponse::new();
        let req = RequestContext::new(Method::DELETE, "/");
        match GetOnly.handle(&req, &mut resp, &PathParams::new()).await {
            Err(ApiError::Response(exc)) => {
                assert_eq!(exc.status, 405);
                assert!(exc.body.get("badMethod").is_some());
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_not_implemented_for_any_method() {
        for method in [Method::GET, Method::POST, Method::PATCH] {
            let mut resp = ApiResponse::new();
            let req = RequestContext::new(method, "/ping");
            NotImplemented.handle(&req, &mut resp, &PathParams::new()).await.unwrap();
            assert_eq!(resp.status, 501);
            assert_eq!(resp.json_body(), Some(&faults::not_implemented().to_body()));
        }
    }
}
