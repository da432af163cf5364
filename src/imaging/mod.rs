//! Image fetch and channel averaging.
//!
//! # Data Flow
//! ```text
//! URL (request target)
//!     → fetch.rs (HTTP GET, status check, body bytes)
//!     → decode.rs (sniff format, decode, drop alpha, per-channel means)
//!     → ChannelAverages
//! ```
//!
//! # Design Decisions
//! - The server talks to an [`ImageSource`] so it can run against a stub
//! - No URL validation; whatever the client sent is requested as-is
//! - Every failure is a [`FetchError`]; none of them end the process

pub mod decode;
pub mod fetch;

use async_trait::async_trait;
use thiserror::Error;

use crate::classify::ChannelAverages;

pub use decode::{channel_averages, decode_averages};
pub use fetch::HttpImageSource;

/// Error produced while fetching or decoding an image.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport failure, timeout, or an unusable URL.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),

    /// The payload is not a decodable image.
    #[error("decode failed: {0}")]
    Decode(#[from] image::ImageError),

    /// The image has no pixels to average.
    #[error("image has no pixels")]
    EmptyImage,

    /// The blocking decode task did not complete.
    #[error("decode task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Something that turns a URL into per-channel averages.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn channel_averages(&self, url: &str) -> Result<ChannelAverages, FetchError>;
}
