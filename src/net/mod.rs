//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (sequential accept)
//!     → connection.rs (lifecycle tracking, state machine)
//!     → Hand off to HTTP layer
//!
//! Connection States:
//!     Accepted → HeaderPending → BodyAccumulating → Complete → ResponseSent → Closed
//! ```
//!
//! # Design Decisions
//! - One connection at a time; the next accept waits for the previous close
//! - No TLS

pub mod connection;
pub mod listener;

pub use connection::{Connection, ConnectionId, ConnectionState};
pub use listener::{Listener, ListenerError};
