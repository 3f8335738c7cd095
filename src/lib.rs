//! OpenStack API compatibility shim.
//!
//! Exposes OpenStack REST surfaces and hands each request to pluggable
//! drivers that talk to a single backend cloud API.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server (axum shell, body limit, panic guard)
//!                         │
//!                         ▼
//!                     app::Api ── routing (RouteSet, `.json` aliases)
//!                         │
//!                         ▼
//!                     hooks::BeforeChain  (request id, admin token, auth, log,
//!                         │                backend client)
//!                         ▼
//!                     Resource (bound by a driver)
//!                         │            └── error ──▶ errors::ErrorTranslator
//!                         ▼                                 │
//!                     hooks::AfterChain ◀───────────────────┘
//!                         │             (format, request id echo, log)
//!     Client Response     ▼
//!     ◀────────────── ApiResponse
//!
//!     Cross-cutting: config (TOML + hot reload of auth), observability
//!     (tracing, Prometheus), lifecycle (signals, graceful shutdown)
//! ```

// Core subsystems
pub mod app;
pub mod errors;
pub mod hooks;
pub mod http;
pub mod routing;

// Collaborators
pub mod auth;
pub mod backend;
pub mod drivers;
pub mod services;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;

pub use app::{Api, App, LoadError};
pub use config::ShimConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
