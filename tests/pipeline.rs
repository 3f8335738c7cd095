//! End-to-end pipeline tests through the axum router.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, StatusCode};
use serde_json::json;

use openstack_shim::auth::AuthToken;
use openstack_shim::errors::ApiError;
use openstack_shim::hooks::{before_fn, HookRegistry};
use openstack_shim::http::{ApiResponse, BodySchema, PathParams, RequestContext, Resource};
use openstack_shim::routing::Dispatcher;

mod common;
use common::{bare_config, get, loaded_shim, router, send, shim, shim_with_registry};

struct Ok200;

#[async_trait]
impl Resource for Ok200 {
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

/// Echoes the request id it was given.
struct EchoRequestId;

#[async_trait]
impl Resource for EchoRequestId {
    async fn on_get(
        &self,
        req: &RequestContext,
        resp: &mut ApiResponse,
        _params: &PathParams,
    ) -> Result<(), ApiError> {
        resp.set_json(200, json!({"request_id": req.request_id()}));
        Ok(())
    }
}

struct CreateServer {
    schema: BodySchema,
}

impl CreateServer {
    fn new() -> Self {
        let schema = BodySchema::compile(&json!({
            "type": "object",
            "required": ["server"],
            "properties": {
                "server": {
                    "type": "object",
                    "required": ["name"],
                    "properties": {"name": {"type": "string"}}
                }
            }
        }))
        .unwrap();
        Self { schema }
    }
}

#[async_trait]
impl Resource for CreateServer {
    async fn on_post(
        &self,
        req: &RequestContext,
        resp: &mut ApiResponse,
        _params: &PathParams,
    ) -> Result<(), ApiError> {
        let body = req.validated_json(&self.schema)?;
        resp.set_json(202, json!({"server": {"name": body["server"]["name"]}}));
        Ok(())
    }
}

struct Slow;

#[async_trait]
impl Resource for Slow {
    async fn on_get(
        &self,
        _req: &RequestContext,
        resp: &mut ApiResponse,
        _params: &PathParams,
    ) -> Result<(), ApiError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        resp.set_json(200, json!({}));
        Ok(())
    }
}

struct Explodes;

#[async_trait]
impl Resource for Explodes {
    async fn on_get(
        &self,
        _req: &RequestContext,
        _resp: &mut ApiResponse,
        _params: &PathParams,
    ) -> Result<(), ApiError> {
        panic!("handler bug");
    }
}

fn routed(name: &str, template: &str, handler: Arc<dyn Resource>) -> Dispatcher {
    let mut disp = Dispatcher::new("");
    disp.add_endpoint(name, template).unwrap();
    disp.set_handler(name, handler).unwrap();
    disp
}

#[tokio::test]
async fn test_declared_endpoint_without_handler_is_not_implemented() {
    let mut shim = shim(bare_config());
    let mut disp = Dispatcher::new("");
    disp.add_endpoint("ping", "/ping").unwrap();
    shim.app.add_dispatcher("test", disp);
    let router = router(shim.app.make_api(), shim.app.config());

    let resp = send(&router, get("/ping").body(Body::empty()).unwrap()).await;
    assert_eq!(resp.status, StatusCode::NOT_IMPLEMENTED);
    assert_eq!(
        resp.body,
        json!({"notImplemented": {"message": "Not Implemented", "code": "501", "details": "Not Implemented"}})
    );
}

#[tokio::test]
async fn test_handler_body_is_formatted() {
    let mut shim = shim(bare_config());
    shim.app
        .add_dispatcher("test", routed("ok", "/ok", Arc::new(Ok200)));
    let api = shim.app.make_api();

    let resp = api.handle(RequestContext::new(Method::GET, "/ok")).await;
    assert_eq!(resp.status_line.as_deref(), Some("200 OK"));
    assert_eq!(resp.content_type(), Some("application/json"));
    assert_eq!(resp.raw_body().map(|b| b.as_ref()), Some(&b"{\"ok\":true}"[..]));

    let router = router(api, shim.app.config());
    let resp = send(&router, get("/ok").body(Body::empty()).unwrap()).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.header("content-type"), Some("application/json"));
    assert_eq!(resp.body, json!({"ok": true}));
}

#[tokio::test]
async fn test_schema_violation_is_bad_request_and_after_hooks_run() {
    let mut shim = shim(bare_config());
    shim.app.add_dispatcher(
        "test",
        routed("servers", "/servers", Arc::new(CreateServer::new())),
    );
    let router = router(shim.app.make_api(), shim.app.config());

    let request = get("/servers")
        .method("POST")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"server": {}}"#))
        .unwrap();
    let resp = send(&router, request).await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    let description = resp.body["badRequest"]["description"].as_str().unwrap_or_default();
    assert!(description.contains("name"), "{description}");
    assert!(resp.header("x-compute-request-id").is_some_and(|id| id.starts_with("req-")));

    let request = get("/servers")
        .method("POST")
        .body(Body::from(r#"{"server": {"name": "web1"}}"#))
        .unwrap();
    let resp = send(&router, request).await;
    assert_eq!(resp.status, StatusCode::ACCEPTED);
    assert_eq!(resp.body["server"]["name"], "web1");
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let mut shim = shim(bare_config());
    shim.app.add_dispatcher(
        "test",
        routed("servers", "/servers", Arc::new(CreateServer::new())),
    );
    let router = router(shim.app.make_api(), shim.app.config());

    let request = get("/servers").method("POST").body(Body::from("{")).unwrap();
    let resp = send(&router, request).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["badRequest"]["description"], "Malformed request body");
}

#[tokio::test]
async fn test_required_hooks_run_in_registration_order() {
    let registry = Arc::new(HookRegistry::new());
    let counter = Arc::new(AtomicUsize::new(0));
    let seen = Arc::new(Mutex::new(Vec::new()));

    for name in ["a", "b"] {
        let counter = counter.clone();
        let seen = seen.clone();
        registry.add_before_hook(
            Arc::new(before_fn(name, move |_, _| {
                let tick = counter.fetch_add(1, Ordering::SeqCst);
                seen.lock().unwrap().push((name, tick));
                Ok(())
            })),
            false,
        );
    }

    let mut shim = shim_with_registry(bare_config(), registry);
    shim.app
        .add_dispatcher("test", routed("ok", "/ok", Arc::new(Ok200)));
    let api = shim.app.make_api();
    assert_eq!(api.before_hook_names(), vec!["a", "b", "set_request_id"]);

    for _ in 0..3 {
        api.handle(RequestContext::new(Method::GET, "/ok")).await;
    }
    let seen = seen.lock().unwrap().clone();
    assert_eq!(
        seen,
        vec![("a", 0), ("b", 1), ("a", 2), ("b", 3), ("a", 4), ("b", 5)]
    );
}

#[tokio::test]
async fn test_request_id_round_trip() {
    let mut shim = shim(bare_config());
    shim.app.add_dispatcher(
        "test",
        routed("echo", "/echo", Arc::new(EchoRequestId)),
    );
    let router = router(shim.app.make_api(), shim.app.config());

    let resp = send(&router, get("/echo").body(Body::empty()).unwrap()).await;
    let header = resp.header("x-compute-request-id").unwrap_or_default().to_string();
    assert!(header.starts_with("req-"));
    assert_eq!(resp.body["request_id"], header.as_str());
}

#[tokio::test]
async fn test_missing_token_on_protected_path() {
    let shim = loaded_shim(Default::default());
    let router = router(shim.app.make_api(), shim.app.config());

    let resp = send(
        &router,
        get("/compute/v2/123/servers").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        resp.body["unauthorized"]["message"],
        "Authentication token required for GET:/compute/v2/123/servers"
    );
}

#[tokio::test]
async fn test_invalid_token_is_unauthorized() {
    let shim = loaded_shim(Default::default());
    let router = router(shim.app.make_api(), shim.app.config());

    let request = get("/compute/v2/123")
        .header("x-auth-token", "bogus")
        .body(Body::empty())
        .unwrap();
    let resp = send(&router, request).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.body["unauthorized"]["code"], "401");
    assert!(resp.header("x-compute-request-id").is_some());
}

#[tokio::test]
async fn test_valid_token_reaches_handler() {
    let shim = loaded_shim(Default::default());
    shim.tokens
        .insert("good", AuthToken::new("u-1", "jsmith", "123"));
    let router = router(shim.app.make_api(), shim.app.config());

    let request = get("/compute/v2/123")
        .header("x-auth-token", "good")
        .body(Body::empty())
        .unwrap();
    let resp = send(&router, request).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["version"]["id"], "v2.0");

    let request = get("/compute/v2/999")
        .header("x-auth-token", "good")
        .body(Body::empty())
        .unwrap();
    let resp = send(&router, request).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_allowlisted_path_without_token() {
    let shim = loaded_shim(Default::default());
    let router = router(shim.app.make_api(), shim.app.config());

    let resp = send(&router, get("/compute").body(Body::empty()).unwrap()).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["versions"][0]["id"], "v2.0");
    assert_eq!(
        resp.body["versions"][0]["links"][0]["href"],
        "http://localhost:5000/compute/v2"
    );
}

#[tokio::test]
async fn test_admin_token_bypasses_auth() {
    let mut config = openstack_shim::ShimConfig::default();
    config.auth.admin_token = Some("s3cret".into());
    let shim = loaded_shim(config);
    let router = router(shim.app.make_api(), shim.app.config());

    let request = get("/compute/v2/123")
        .header("x-auth-token", "s3cret")
        .body(Body::empty())
        .unwrap();
    let resp = send(&router, request).await;
    assert_eq!(resp.status, StatusCode::OK);
}

#[tokio::test]
async fn test_json_alias() {
    let mut config = openstack_shim::ShimConfig::default();
    config.auth.admin_token = Some("s3cret".into());
    let shim = loaded_shim(config);
    let router = router(shim.app.make_api(), shim.app.config());

    let fetch = |path: &str| {
        get(path)
            .header("x-auth-token", "s3cret")
            .body(Body::empty())
            .unwrap()
    };
    let plain = send(&router, fetch("/compute")).await;
    let alias = send(&router, fetch("/compute.json")).await;
    assert_eq!(plain.status, StatusCode::OK);
    assert_eq!(alias.status, StatusCode::OK);
    assert_eq!(alias.body, plain.body);
}

#[tokio::test]
async fn test_json_alias_is_not_on_the_no_auth_list() {
    let shim = loaded_shim(Default::default());
    let router = router(shim.app.make_api(), shim.app.config());

    let plain = send(&router, get("/compute").body(Body::empty()).unwrap()).await;
    let alias = send(&router, get("/compute.json").body(Body::empty()).unwrap()).await;
    assert_eq!(plain.status, StatusCode::OK);
    assert_eq!(alias.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unsupported_verb_is_bad_method() {
    let mut shim = shim(bare_config());
    shim.app
        .add_dispatcher("test", routed("ok", "/ok", Arc::new(Ok200)));
    let router = router(shim.app.make_api(), shim.app.config());
    let request = get("/ok").method("PUT").body(Body::empty()).unwrap();
    let resp = send(&router, request).await;
    assert_eq!(resp.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(resp.body["badMethod"]["code"], "405");
}

#[tokio::test]
async fn test_timeout_is_service_unavailable() {
    let mut config = bare_config();
    config.timeouts.request_secs = 1;
    let mut shim = shim(config);
    shim.app
        .add_dispatcher("test", routed("slow", "/slow", Arc::new(Slow)));
    let router = router(shim.app.make_api(), shim.app.config());

    let resp = send(&router, get("/slow").body(Body::empty()).unwrap()).await;
    assert_eq!(resp.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(resp.body["computeFault"]["message"], "Service Unavailable");
    assert!(resp.header("x-compute-request-id").is_some());
}

#[tokio::test]
async fn test_panicking_handler_is_service_unavailable() {
    let mut shim = shim(bare_config());
    shim.app.add_dispatcher(
        "test",
        routed("boom", "/boom", Arc::new(Explodes)),
    );
    let router = router(shim.app.make_api(), shim.app.config());

    let resp = send(&router, get("/boom").body(Body::empty()).unwrap()).await;
    assert_eq!(resp.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(resp.body["computeFault"]["code"], "503");
    assert!(!resp.body.to_string().contains("handler bug"));
}

#[tokio::test]
async fn test_oversized_body_is_over_limit() {
    let mut config = bare_config();
    config.security.max_body_size = 16;
    let mut shim = shim(config);
    shim.app.add_dispatcher(
        "test",
        routed("servers", "/servers", Arc::new(CreateServer::new())),
    );
    let router = router(shim.app.make_api(), shim.app.config());

    let request = get("/servers")
        .method("POST")
        .body(Body::from(r#"{"server": {"name": "far-too-long-for-the-limit"}}"#))
        .unwrap();
    let resp = send(&router, request).await;
    assert_eq!(resp.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(resp.body["overLimit"]["code"], "413");
    assert!(resp.header("x-compute-request-id").is_some());
}
