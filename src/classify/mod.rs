//! Dominant color classification.
//!
//! # Data Flow
//! ```text
//! ChannelAverages (from imaging)
//!     → classifier.rs (L1 distance to every palette entry, nearest wins)
//!     → threshold check (distance > reject_threshold → "no match")
//!     → Classification
//! ```
//!
//! # Design Decisions
//! - Palette is built once at startup and shared read-only
//! - Classification is a pure function, safe to call from anywhere
//! - Ties resolve to the earliest palette entry

pub mod classifier;
pub mod palette;

pub use classifier::{classify, l1_distance, Classification, NO_MATCH};
pub use palette::{ChannelAverages, ColorEntry, Palette, PaletteError};
