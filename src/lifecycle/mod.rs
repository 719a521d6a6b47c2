//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//!
//! Shutdown (shutdown.rs):
//!     Broadcast → HTTP server stops accepting, sweeper exits
//! ```
//!
//! # Design Decisions
//! - Ordered startup lives in main: config first, then registry, then listener
//! - Every long-running task subscribes to the same shutdown broadcast

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
