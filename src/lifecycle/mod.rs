//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Init logging/metrics → Bind listener → Serve
//!
//! Shutdown (shutdown.rs, signals.rs):
//!     SIGINT → Shutdown::trigger → accept loop exits → listener dropped
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Interrupt aborts the connection in flight, there is nothing to drain

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
