//! Nearest-color search under L1 distance.

use crate::classify::palette::{ChannelAverages, ColorEntry, Palette};

/// Response content sent when the nearest color is too far away.
pub const NO_MATCH: &str = "no match";

/// Outcome of classifying one set of channel averages.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification<'a> {
    /// Nearest entry is within the threshold.
    Matched { entry: &'a ColorEntry, distance: f64 },
    /// Nearest entry exceeds the threshold.
    Rejected { nearest: &'a ColorEntry, distance: f64 },
}

impl<'a> Classification<'a> {
    /// Text written back to the client.
    pub fn content(&self) -> &'a str {
        match self {
            Classification::Matched { entry, .. } => entry.name(),
            Classification::Rejected { .. } => NO_MATCH,
        }
    }

    pub fn distance(&self) -> f64 {
        match self {
            Classification::Matched { distance, .. } | Classification::Rejected { distance, .. } => {
                *distance
            }
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Classification::Rejected { .. })
    }
}

/// Sum of absolute per-channel differences.
pub fn l1_distance(entry: &ColorEntry, averages: &ChannelAverages) -> f64 {
    (f64::from(entry.red()) - averages.red).abs()
        + (f64::from(entry.green()) - averages.green).abs()
        + (f64::from(entry.blue()) - averages.blue).abs()
}

/// Find the palette entry nearest to `averages`.
///
/// The first entry wins ties. A distance strictly greater than
/// `reject_threshold` is rejected; equality still matches.
pub fn classify<'a>(
    averages: ChannelAverages,
    palette: &'a Palette,
    reject_threshold: f64,
) -> Classification<'a> {
    let first = palette.first();
    let (nearest, distance) = palette.rest().iter().fold(
        (first, l1_distance(first, &averages)),
        |(best, best_distance), entry| {
            let distance = l1_distance(entry, &averages);
            if distance < best_distance {
                (entry, distance)
            } else {
                (best, best_distance)
            }
        },
    );

    if distance > reject_threshold {
        Classification::Rejected { nearest, distance }
    } else {
        Classification::Matched {
            entry: nearest,
            distance,
        }
    }
}
