//! Shared utilities for the integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tower::ServiceExt;

use openstack_shim::auth::{shared_settings, AuthSettings, SharedAuthSettings, TokenStore};
use openstack_shim::config::ShimConfig;
use openstack_shim::hooks::{HookDeps, HookRegistry};
use openstack_shim::{Api, App, HttpServer};

pub const HOST: &str = "localhost:5000";

/// An app together with the collaborators the tests poke at.
pub struct TestShim {
    pub app: App,
    pub tokens: Arc<TokenStore>,
    pub settings: SharedAuthSettings,
    pub hooks: Arc<HookRegistry>,
}

/// Defaults, but no service is enabled and no optional hook is loaded.
pub fn bare_config() -> ShimConfig {
    let mut config = ShimConfig::default();
    config.enabled_services.clear();
    config.hooks.request_hooks.clear();
    config.hooks.response_hooks.clear();
    config
}

pub fn shim(config: ShimConfig) -> TestShim {
    shim_with_registry(config, Arc::new(HookRegistry::new()))
}

pub fn shim_with_registry(config: ShimConfig, hooks: Arc<HookRegistry>) -> TestShim {
    let settings = shared_settings(AuthSettings::from_config(&config.auth).unwrap());
    let tokens = Arc::new(TokenStore::new());
    let deps = HookDeps::new(settings.clone(), tokens.clone());
    let app = App::new(config, hooks.clone(), deps).unwrap();
    TestShim {
        app,
        tokens,
        settings,
        hooks,
    }
}

/// Default config with every service loaded through its driver.
pub fn loaded_shim(config: ShimConfig) -> TestShim {
    let mut shim = shim(config);
    shim.app.load_endpoints().unwrap();
    shim.app.load_drivers().unwrap();
    shim
}

pub fn router(api: Api, config: &ShimConfig) -> Router {
    HttpServer::new(Arc::new(api), config).router()
}

pub fn get(path: &str) -> axum::http::request::Builder {
    Request::builder().method("GET").uri(path).header("host", HOST)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

pub async fn send(router: &Router, request: Request<Body>) -> TestResponse {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    TestResponse {
        status,
        headers,
        body,
    }
}

/// Start a mock backend that answers every request with `status` and a
/// JSON `body`. Returns its address.
pub async fn start_mock_backend(status: u16, body: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 {status} MOCK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });
    addr
}
