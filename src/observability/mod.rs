//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (tracing-subscriber fmt layer)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID is a field on every pipeline log line
//! - Metrics are cheap (atomic increments) and no-ops until a recorder is installed
//! - `RUST_LOG` overrides the configured log level

pub mod logging;
pub mod metrics;
