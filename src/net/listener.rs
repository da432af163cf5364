//! TCP listener implementation.
//!
//! # Responsibilities
//! - Resolve and bind the configured address (SO_REUSEADDR, explicit backlog)
//! - Accept incoming TCP connections one at a time
//! - Release the socket when dropped

use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::{TcpListener, TcpSocket, TcpStream};

use crate::config::ListenerConfig;

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Address could not be resolved.
    #[error("Failed to resolve {address}: {source}")]
    Resolve {
        address: String,
        source: std::io::Error,
    },
    /// Address resolved to nothing.
    #[error("No usable address for {0}")]
    NoAddress(String),
    /// Failed to bind to address.
    #[error("Failed to bind: {0}")]
    Bind(std::io::Error),
    /// Failed to accept connection.
    #[error("Failed to accept: {0}")]
    Accept(std::io::Error),
}

/// Listening socket for the service.
pub struct Listener {
    inner: TcpListener,
}

impl Listener {
    /// Bind to the configured address.
    pub async fn bind(config: &ListenerConfig) -> Result<Self, ListenerError> {
        let addr = resolve(&config.bind_address).await?;

        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()
        } else {
            TcpSocket::new_v6()
        }
        .map_err(ListenerError::Bind)?;
        socket.set_reuseaddr(true).map_err(ListenerError::Bind)?;
        socket.bind(addr).map_err(ListenerError::Bind)?;
        let listener = socket.listen(config.backlog).map_err(ListenerError::Bind)?;

        let local_addr = listener.local_addr().map_err(ListenerError::Bind)?;
        tracing::info!(
            address = %local_addr,
            backlog = config.backlog,
            "Listener bound"
        );

        Ok(Self { inner: listener })
    }

    /// Accept the next connection.
    pub async fn accept(&self) -> Result<(TcpStream, SocketAddr), ListenerError> {
        let (stream, addr) = self.inner.accept().await.map_err(ListenerError::Accept)?;
        tracing::debug!(peer_addr = %addr, "Connection accepted");
        Ok((stream, addr))
    }

    /// Get the local address this listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.inner.local_addr()
    }
}

async fn resolve(address: &str) -> Result<SocketAddr, ListenerError> {
    let mut addrs = tokio::net::lookup_host(address)
        .await
        .map_err(|source| ListenerError::Resolve {
            address: address.to_string(),
            source,
        })?;
    addrs
        .next()
        .ok_or_else(|| ListenerError::NoAddress(address.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn binds_ephemeral_port() {
        let config = ListenerConfig {
            bind_address: "127.0.0.1:0".into(),
            backlog: 4,
        };
        let listener = Listener::bind(&config).await.unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), 0);
    }

    #[tokio::test]
    async fn unresolvable_address_fails() {
        let config = ListenerConfig {
            bind_address: "not an address".into(),
            backlog: 1,
        };
        assert!(matches!(
            Listener::bind(&config).await,
            Err(ListenerError::Resolve { .. })
        ));
    }

    #[tokio::test]
    async fn accepts_a_client() {
        let config = ListenerConfig {
            bind_address: "127.0.0.1:0".into(),
            backlog: 1,
        };
        let listener = Listener::bind(&config).await.unwrap();
        let addr = listener.local_addr().unwrap();

        let client = tokio::spawn(async move { TcpStream::connect(addr).await });
        let (_stream, peer) = listener.accept().await.unwrap();
        let client = client.await.unwrap().unwrap();
        assert_eq!(peer, client.local_addr().unwrap());
    }
}
