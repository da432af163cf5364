//! Color probe: a single-connection-at-a-time service that fetches the image
//! named by the request path and answers with the nearest palette color.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ───────────────▶ net::Listener ──▶ http::reader ──▶ http::request
//!                                                              │ target URL
//!                                                              ▼
//!                                      imaging (fetch + decode + channel means)
//!                                                              │ ChannelAverages
//!                                                              ▼
//!     Client Response                                   classify (L1, threshold)
//!     ◀─────────────── http::response ◀───────────────────────┘ content
//!
//!     Cross-cutting: config, observability, resilience (timeouts), lifecycle
//! ```

// Core subsystems
pub mod classify;
pub mod config;
pub mod http;
pub mod imaging;
pub mod net;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use classify::{classify, ChannelAverages, Classification, ColorEntry, Palette};
pub use config::ServiceConfig;
pub use http::ColorServer;
pub use lifecycle::Shutdown;
