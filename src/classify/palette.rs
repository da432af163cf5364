//! Reference palette and channel average types.

use std::sync::Arc;
use thiserror::Error;

use crate::config::PaletteEntryConfig;

/// A named reference color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorEntry {
    name: Arc<str>,
    rgb: [u8; 3],
}

impl ColorEntry {
    pub fn new(name: impl Into<Arc<str>>, red: u8, green: u8, blue: u8) -> Self {
        Self {
            name: name.into(),
            rgb: [red, green, blue],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn red(&self) -> u8 {
        self.rgb[0]
    }

    pub fn green(&self) -> u8 {
        self.rgb[1]
    }

    pub fn blue(&self) -> u8 {
        self.rgb[2]
    }
}

impl From<&PaletteEntryConfig> for ColorEntry {
    fn from(entry: &PaletteEntryConfig) -> Self {
        let [r, g, b] = entry.rgb;
        Self::new(entry.name.as_str(), r, g, b)
    }
}

/// Per-channel arithmetic means over every pixel of an image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelAverages {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

impl ChannelAverages {
    pub fn new(red: f64, green: f64, blue: f64) -> Self {
        Self { red, green, blue }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaletteError {
    #[error("palette must contain at least one color")]
    Empty,
}

/// Ordered, non-empty list of reference colors.
///
/// Iteration order is the tie-break order used by [`classify`](super::classify).
/// The first entry is held on its own, so an empty palette is unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    first: ColorEntry,
    rest: Vec<ColorEntry>,
}

impl Palette {
    pub fn new(entries: Vec<ColorEntry>) -> Result<Self, PaletteError> {
        let mut entries = entries.into_iter();
        let first = entries.next().ok_or(PaletteError::Empty)?;
        Ok(Self {
            first,
            rest: entries.collect(),
        })
    }

    pub fn from_config(entries: &[PaletteEntryConfig]) -> Result<Self, PaletteError> {
        Self::new(entries.iter().map(ColorEntry::from).collect())
    }

    /// Entries in tie-break order.
    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &ColorEntry> + '_ {
        std::iter::once(&self.first).chain(&self.rest)
    }

    pub fn first(&self) -> &ColorEntry {
        &self.first
    }

    /// Every entry after the first.
    pub fn rest(&self) -> &[ColorEntry] {
        &self.rest
    }
}

impl Default for Palette {
    /// teal, red, black, navy
    fn default() -> Self {
        Self {
            first: ColorEntry::new("teal", 0, 128, 128),
            rest: vec![
                ColorEntry::new("red", 255, 0, 0),
                ColorEntry::new("black", 0, 0, 0),
                ColorEntry::new("navy", 0, 0, 128),
            ],
        }
    }
}
