//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum shell, body limit, panic guard, tracing)
//!     → context.rs (RequestContext built from the request parts)
//!     → [app pipeline: before-hooks → resource → after-hooks]
//!     → response.rs (ApiResponse converted back to an axum response)
//!     → Send to client
//! ```

pub mod context;
pub mod resource;
pub mod response;
pub mod schema;
pub mod server;

pub use context::{PathParams, RemoteUser, RequestContext};
pub use resource::{NotImplemented, Resource};
pub use response::{status_line, ApiResponse, ResponseBody, APPLICATION_JSON};
pub use schema::BodySchema;
pub use server::HttpServer;

/// Header echoing the request id on every response.
pub const X_COMPUTE_REQUEST_ID: &str = "x-compute-request-id";
/// Bearer token header.
pub const X_AUTH_TOKEN: &str = "x-auth-token";
/// Project (tenant) header used when the path carries no tenant.
pub const X_AUTH_PROJECT_ID: &str = "x-auth-project-id";
