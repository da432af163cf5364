//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Socket read / image fetch:
//!     → timeouts.rs (optional deadline per operation)
//! ```
//!
//! # Design Decisions
//! - Deadlines are opt-out (0 in config) rather than opt-in
//! - A timeout only ever aborts the current connection

pub mod timeouts;

pub use timeouts::{bounded, TimedOut};
