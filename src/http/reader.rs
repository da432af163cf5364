//! Length-aware request read loop.
//!
//! # Data Flow
//! ```text
//! block 1 → ParsedRequest::parse → content-length arithmetic → bytes_remaining
//! block n → append to raw/body     → bytes_remaining -= block_size
//! stop when bytes_remaining <= 0 or the peer sends nothing
//! ```
//!
//! The arithmetic deliberately counts whole blocks: the body already read
//! with the first block is `block_size - header_len`, and each later read
//! subtracts `block_size` whatever it actually returned.

use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::http::request::{ParseError, ParsedRequest, CONTENT_LENGTH};
use crate::net::{Connection, ConnectionState};
use crate::resilience::timeouts::{self, TimedOut};

/// Error produced while reading a request off a connection.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("invalid content-length {0:?}")]
    InvalidContentLength(String),

    #[error("read {0}")]
    TimedOut(#[from] TimedOut),
}

/// State threaded through one connection's read loop.
#[derive(Debug)]
pub struct ReadState {
    block_size: usize,
    bytes_remaining: i64,
    request: Option<ParsedRequest>,
}

impl ReadState {
    pub fn new(block_size: usize) -> Self {
        Self {
            block_size,
            // Sentinel until the header block is parsed.
            bytes_remaining: block_size as i64,
            request: None,
        }
    }

    pub fn bytes_remaining(&self) -> i64 {
        self.bytes_remaining
    }

    pub fn is_complete(&self) -> bool {
        self.bytes_remaining <= 0
    }

    /// How many bytes the next read may return.
    pub fn next_read_len(&self) -> usize {
        if self.bytes_remaining > self.block_size as i64 {
            self.block_size
        } else {
            self.bytes_remaining.max(0) as usize
        }
    }

    /// Fold one block into the state.
    pub fn absorb(&mut self, chunk: &[u8]) -> Result<(), ReadError> {
        let block = self.block_size as i64;
        match self.request.as_mut() {
            None => {
                let request = ParsedRequest::parse(chunk)?;
                let body_already_read = block - request.header_byte_len() as i64;
                self.bytes_remaining = match request.header(CONTENT_LENGTH) {
                    Some(value) => {
                        let declared: i64 = value
                            .trim()
                            .parse()
                            .ok()
                            .filter(|n| *n >= 0)
                            .ok_or_else(|| ReadError::InvalidContentLength(value.to_string()))?;
                        declared.saturating_sub(body_already_read)
                    }
                    None => 0,
                };
                self.request = Some(request);
            }
            Some(request) => {
                request.append(chunk);
                self.bytes_remaining = self.bytes_remaining.saturating_sub(block);
            }
        }
        Ok(())
    }

    pub fn has_request(&self) -> bool {
        self.request.is_some()
    }

    /// The accumulated request; an empty one if nothing was ever parsed.
    pub fn finish(self) -> ParsedRequest {
        self.request.unwrap_or_default()
    }
}

/// Reads complete requests in fixed-size blocks.
#[derive(Debug, Clone)]
pub struct ConnectionReader {
    block_size: usize,
    read_timeout: Option<Duration>,
}

impl ConnectionReader {
    pub fn new(block_size: usize, read_timeout: Option<Duration>) -> Self {
        Self {
            block_size,
            read_timeout,
        }
    }

    /// Read one request, advancing the connection through
    /// HeaderPending → BodyAccumulating → Complete.
    pub async fn read_request<S>(&self, conn: &mut Connection<S>) -> Result<ParsedRequest, ReadError>
    where
        S: AsyncRead + Unpin,
    {
        conn.transition(ConnectionState::HeaderPending);

        let mut state = ReadState::new(self.block_size);
        let mut buf = vec![0u8; self.block_size];

        while !state.is_complete() {
            let want = state.next_read_len();
            let n = timeouts::bounded(self.read_timeout, conn.stream_mut().read(&mut buf[..want])).await??;

            // An empty first block still parses (to an empty request).
            if n == 0 && state.has_request() {
                tracing::debug!(
                    connection_id = %conn.id(),
                    bytes_remaining = state.bytes_remaining(),
                    "Peer closed before declared body was read"
                );
                break;
            }

            state.absorb(&buf[..n])?;
            if !state.is_complete() {
                conn.transition(ConnectionState::BodyAccumulating);
            }
        }

        conn.transition(ConnectionState::Complete);
        Ok(state.finish())
    }
}
