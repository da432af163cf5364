//! Connection state machine and lifecycle tracking.
//!
//! # Responsibilities
//! - Track connection state (Accepted → HeaderPending → BodyAccumulating →
//!   Complete → ResponseSent → Closed)
//! - Generate unique connection IDs for tracing
//! - Own the stream for the duration of one request/response exchange

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

/// Global atomic counter for connection IDs.
/// Using relaxed ordering is sufficient since we only need uniqueness, not synchronization.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generate a new unique connection ID.
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Connection state for lifecycle tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConnectionState {
    /// Accepted, nothing read yet.
    Accepted,
    /// Waiting for the first block (request line and headers).
    HeaderPending,
    /// Headers parsed, more body bytes expected.
    BodyAccumulating,
    /// Request fully read.
    Complete,
    /// Response written.
    ResponseSent,
    /// Stream shut down.
    Closed,
}

/// One accepted client connection.
#[derive(Debug)]
pub struct Connection<S> {
    id: ConnectionId,
    peer: SocketAddr,
    stream: S,
    state: ConnectionState,
}

impl<S> Connection<S> {
    pub fn new(stream: S, peer: SocketAddr) -> Self {
        let id = ConnectionId::new();
        tracing::trace!(connection_id = %id, peer_addr = %peer, "Connection accepted");
        Self {
            id,
            peer,
            stream,
            state: ConnectionState::Accepted,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn stream_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    /// Move to `next`. States only ever move forward.
    pub fn transition(&mut self, next: ConnectionState) {
        debug_assert!(next >= self.state, "{:?} -> {:?}", self.state, next);
        if next != self.state {
            tracing::trace!(
                connection_id = %self.id,
                from = ?self.state,
                to = ?next,
                "Connection state change"
            );
            self.state = next;
        }
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> Connection<S> {
    /// Write the full response and mark it sent.
    pub async fn send(&mut self, response: &[u8]) -> std::io::Result<()> {
        self.stream.write_all(response).await?;
        self.stream.flush().await?;
        self.transition(ConnectionState::ResponseSent);
        Ok(())
    }

    /// Shut the stream down. Errors are logged, the connection is closed either way.
    pub async fn close(mut self) {
        if let Err(e) = self.stream.shutdown().await {
            tracing::debug!(connection_id = %self.id, error = %e, "Shutdown failed");
        }
        self.transition(ConnectionState::Closed);
        tracing::trace!(connection_id = %self.id, "Connection closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    #[test]
    fn connection_id_unique() {
        let id1 = ConnectionId::new();
        let id2 = ConnectionId::new();
        assert_ne!(id1, id2);
        assert!(id2.as_u64() > id1.as_u64());
    }

    #[test]
    fn states_move_forward() {
        let mut conn = Connection::new(tokio::io::empty(), peer());
        assert_eq!(conn.state(), ConnectionState::Accepted);

        conn.transition(ConnectionState::HeaderPending);
        conn.transition(ConnectionState::Complete);
        assert_eq!(conn.state(), ConnectionState::Complete);
    }

    #[tokio::test]
    async fn send_then_close() {
        let (client, server) = tokio::io::duplex(64);
        let mut conn = Connection::new(server, peer());
        conn.transition(ConnectionState::Complete);

        conn.send(b"hello").await.unwrap();
        assert_eq!(conn.state(), ConnectionState::ResponseSent);
        conn.close().await;

        let mut client = client;
        let mut received = Vec::new();
        tokio::io::AsyncReadExt::read_to_end(&mut client, &mut received)
            .await
            .unwrap();
        assert_eq!(received, b"hello");
    }
}
