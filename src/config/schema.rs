//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the color probe.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address, backlog).
    pub listener: ListenerConfig,

    /// Request read loop settings.
    pub reader: ReaderConfig,

    /// Palette and rejection threshold.
    pub classifier: ClassifierConfig,

    /// Image fetch settings.
    pub fetch: FetchConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3246").
    pub bind_address: String,

    /// Listen backlog handed to the kernel.
    pub backlog: u32,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "localhost:3246".to_string(),
            backlog: 1,
        }
    }
}

/// Read loop configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Maximum number of bytes requested per read.
    pub block_size: usize,

    /// Per-read timeout in seconds (0 = wait forever).
    pub read_timeout_secs: u64,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            block_size: 8192,
            read_timeout_secs: 30,
        }
    }
}

/// Classifier configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Largest accepted L1 distance to the nearest palette entry.
    pub reject_threshold: f64,

    /// Reference colors, in tie-break order.
    pub palette: Vec<PaletteEntryConfig>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            reject_threshold: 300.0,
            palette: vec![
                PaletteEntryConfig::new("teal", [0, 128, 128]),
                PaletteEntryConfig::new("red", [255, 0, 0]),
                PaletteEntryConfig::new("black", [0, 0, 0]),
                PaletteEntryConfig::new("navy", [0, 0, 128]),
            ],
        }
    }
}

/// A named reference color as written in the config file.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct PaletteEntryConfig {
    pub name: String,

    /// Red, green, blue.
    pub rgb: [u8; 3],
}

impl PaletteEntryConfig {
    pub fn new(name: impl Into<String>, rgb: [u8; 3]) -> Self {
        Self {
            name: name.into(),
            rgb,
        }
    }
}

/// Image fetch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Total timeout for fetching one image, in seconds (0 = no timeout).
    pub timeout_secs: u64,

    /// User-Agent header sent with image requests.
    pub user_agent: String,

    /// Honour HTTP(S)_PROXY / NO_PROXY from the environment.
    pub use_system_proxy: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: concat!("color-probe/", env!("CARGO_PKG_VERSION")).to_string(),
            use_system_proxy: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
