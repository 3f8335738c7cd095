//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router around the assembled pipeline
//! - Buffer request bodies up to the configured limit
//! - Wire up middleware (tracing, panic guard)
//! - Bind server to listener and shut down gracefully
//!
//! # Design Decisions
//! - Axum only hosts; every path goes to one fallback handler and the
//!   shim's own route table does the matching
//! - A panicking handler is answered with the generic 503 fault

use std::any::Any;
use std::future::Future;
use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    response::Response,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::app::Api;
use crate::config::ShimConfig;
use crate::errors::faults;
use crate::http::{ApiResponse, RequestContext};

/// State injected into the fallback handler.
#[derive(Clone)]
struct ServerState {
    api: Arc<Api>,
    max_body_size: usize,
    /// Host used for links when the request carries none.
    fallback_host: Arc<str>,
}

/// HTTP server for the shim.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(api: Arc<Api>, config: &ShimConfig) -> Self {
        let state = ServerState {
            api,
            max_body_size: config.security.max_body_size,
            fallback_host: Arc::from(config.listener.bind_address.as_str()),
        };
        Self {
            router: Self::build_router(state),
        }
    }

    fn build_router(state: ServerState) -> Router {
        Router::new()
            .fallback(handle_request)
            .with_state(state)
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(TraceLayer::new_for_http())
    }

    /// The router, for serving or for driving with `tower::ServiceExt`.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` resolves, then drain in-flight
    /// requests.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn handle_request(State(state): State<ServerState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();

    let response = match axum::body::to_bytes(body, state.max_body_size).await {
        Ok(bytes) => {
            let ctx = RequestContext::from_parts(&parts, bytes, &state.fallback_host);
            state.api.handle(ctx).await
        }
        Err(e) => {
            tracing::warn!(
                method = %parts.method,
                path = %parts.uri.path(),
                limit = state.max_body_size,
                error = %e,
                "Rejecting request body"
            );
            let ctx = RequestContext::from_parts(&parts, Bytes::new(), &state.fallback_host);
            let fault = faults::over_limit("Request body too large")
                .with_details(format!("The limit is {} bytes", state.max_body_size));
            state.api.reject(ctx, fault.into())
        }
    };
    response.into_http()
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = %detail, "Handler panicked");
    ApiResponse::fault(&faults::service_unavailable()).into_http()
}
