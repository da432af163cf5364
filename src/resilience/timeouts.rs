//! Timeout enforcement.
//!
//! # Responsibilities
//! - Turn configured seconds into an optional deadline (0 = none)
//! - Wrap socket reads with that deadline
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other errors

use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// The wrapped operation did not finish in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("timed out after {0:?}")]
pub struct TimedOut(pub Duration);

/// `0` disables the timeout.
pub fn from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

/// Await `fut`, giving up after `limit` if one is set.
pub async fn bounded<F: Future>(limit: Option<Duration>, fut: F) -> Result<F::Output, TimedOut> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| TimedOut(limit)),
        None => Ok(fut.await),
    }
}
