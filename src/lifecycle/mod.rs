//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → every subscriber wakes
//!             → HTTP server stops accepting, drains in-flight requests
//! ```
//!
//! # Design Decisions
//! - Ordered startup lives in main: config, hooks, endpoints, drivers,
//!   then the listener (traffic only when ready)
//! - One broadcast coordinator; late subscribers still observe a trigger

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::wait_for_signal;
