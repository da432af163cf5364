//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the palette never changes while serving
//! - All fields have defaults so an empty file is a valid config
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    ClassifierConfig, FetchConfig, ListenerConfig, ObservabilityConfig, PaletteEntryConfig,
    ReaderConfig, ServiceConfig,
};
pub use validation::ValidationError;
