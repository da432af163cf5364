//! Sequential accept loop and per-request orchestration.
//!
//! # Responsibilities
//! - Accept one connection at a time
//! - Read the request (ConnectionReader)
//! - Pick the response content: DEFAULT, a palette name, or "no match"
//! - Write the response and close the connection
//! - Keep every per-connection failure inside that connection

use std::time::Instant;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::broadcast::{self, error::RecvError};

use crate::classify::{classify, Palette, PaletteError, NO_MATCH};
use crate::config::ServiceConfig;
use crate::http::reader::{ConnectionReader, ReadError};
use crate::http::request::{ParsedRequest, RequestError, FAVICON};
use crate::http::response::{self, DEFAULT_CONTENT};
use crate::imaging::{FetchError, HttpImageSource, ImageSource};
use crate::net::{Connection, Listener};
use crate::observability::metrics;
use crate::resilience::timeouts;

/// Error that ends one connection without a response.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("write failed: {0}")]
    Write(std::io::Error),
}

impl ConnectionError {
    fn reason(&self) -> &'static str {
        match self {
            ConnectionError::Read(ReadError::Io(_)) => "io",
            ConnectionError::Read(ReadError::TimedOut(_)) => "timeout",
            ConnectionError::Read(_) | ConnectionError::Request(_) => "parse",
            ConnectionError::Write(_) => "write",
        }
    }
}

/// Error building a server from configuration.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Palette(#[from] PaletteError),

    #[error("failed to build image client: {0}")]
    Client(#[from] FetchError),
}

/// The color classification service.
pub struct ColorServer<S> {
    reader: ConnectionReader,
    palette: Palette,
    reject_threshold: f64,
    source: S,
}

impl ColorServer<HttpImageSource> {
    /// Build a server that fetches images over HTTP.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ServerError> {
        let source = HttpImageSource::new(&config.fetch)?;
        Ok(Self::new(config, source)?)
    }
}

impl<S: ImageSource> ColorServer<S> {
    /// Build a server around any image source.
    pub fn new(config: &ServiceConfig, source: S) -> Result<Self, PaletteError> {
        Ok(Self {
            reader: ConnectionReader::new(
                config.reader.block_size,
                timeouts::from_secs(config.reader.read_timeout_secs),
            ),
            palette: Palette::from_config(&config.classifier.palette)?,
            reject_threshold: config.classifier.reject_threshold,
            source,
        })
    }

    /// Serve connections one at a time until `shutdown` fires.
    ///
    /// The listener is consumed and released when this returns.
    pub async fn run(&self, listener: Listener, mut shutdown: broadcast::Receiver<()>) {
        if let Ok(addr) = listener.local_addr() {
            tracing::info!(address = %addr, "Serving on http://{}", addr);
        }

        loop {
            let accepted = tokio::select! {
                accepted = listener.accept() => accepted,
                _ = triggered(&mut shutdown) => break,
            };

            let (stream, peer) = match accepted {
                Ok(accepted) => accepted,
                Err(e) => {
                    tracing::warn!(error = %e, "Accept failed");
                    continue;
                }
            };

            tokio::select! {
                _ = self.serve_connection(Connection::new(stream, peer)) => {}
                _ = triggered(&mut shutdown) => break,
            }
        }

        tracing::info!("Exiting...");
    }

    /// Handle one connection from first read to close.
    pub async fn serve_connection<T>(&self, mut conn: Connection<T>)
    where
        T: AsyncRead + AsyncWrite + Unpin,
    {
        if let Err(e) = self.exchange(&mut conn).await {
            tracing::warn!(
                connection_id = %conn.id(),
                peer_addr = %conn.peer(),
                error = %e,
                "Connection aborted"
            );
            metrics::record_aborted(e.reason());
        }
        conn.close().await;
    }

    async fn exchange<T>(&self, conn: &mut Connection<T>) -> Result<(), ConnectionError>
    where
        T: AsyncRead + AsyncWrite + Unpin,
    {
        let request = self.reader.read_request(conn).await?;
        let started = Instant::now();

        tracing::info!(
            connection_id = %conn.id(),
            peer_addr = %conn.peer(),
            request_line = %request.request_line(),
            "Request"
        );

        let content = self.content_for(&request).await?;
        let rendered = response::render(content);
        tracing::debug!(connection_id = %conn.id(), response = %rendered, "Sending response");

        conn.send(rendered.as_bytes())
            .await
            .map_err(ConnectionError::Write)?;
        metrics::record_response(content, started);
        Ok(())
    }

    /// Decide the response content for a fully read request.
    ///
    /// Fetch and decode failures become "no match"; only a request line with
    /// no target is an error.
    pub async fn content_for(&self, request: &ParsedRequest) -> Result<&str, RequestError> {
        let url = match request.target()? {
            None => return Ok(DEFAULT_CONTENT),
            Some(FAVICON) => return Ok(DEFAULT_CONTENT),
            Some(url) => url,
        };

        let averages = match self.source.channel_averages(url).await {
            Ok(averages) => averages,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Image lookup failed");
                metrics::record_fetch_failure();
                return Ok(NO_MATCH);
            }
        };

        let result = classify(averages, &self.palette, self.reject_threshold);
        tracing::debug!(
            url = %url,
            red = averages.red,
            green = averages.green,
            blue = averages.blue,
            distance = result.distance(),
            content = result.content(),
            "Image classified"
        );
        Ok(result.content())
    }
}

/// Resolves once shutdown is actually triggered.
///
/// A closed channel (every `Shutdown` dropped without triggering) never
/// resolves, so losing the signal handler does not stop the server.
async fn triggered(shutdown: &mut broadcast::Receiver<()>) {
    match shutdown.recv().await {
        Ok(()) | Err(RecvError::Lagged(_)) => {}
        Err(RecvError::Closed) => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ChannelAverages;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    /// Returns fixed averages for every URL except "broken".
    struct StubSource {
        averages: ChannelAverages,
        calls: AtomicUsize,
    }

    impl StubSource {
        fn new(red: f64, green: f64, blue: f64) -> Self {
            Self {
                averages: ChannelAverages::new(red, green, blue),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ImageSource for StubSource {
        async fn channel_averages(&self, url: &str) -> Result<ChannelAverages, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if url == "broken" {
                return Err(FetchError::EmptyImage);
            }
            Ok(self.averages)
        }
    }

    fn server(source: StubSource) -> ColorServer<StubSource> {
        ColorServer::new(&ServiceConfig::default(), source).unwrap()
    }

    fn parse(raw: &[u8]) -> ParsedRequest {
        ParsedRequest::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn favicon_never_fetches() {
        let server = server(StubSource::new(0.0, 0.0, 0.0));
        let content = server
            .content_for(&parse(b"GET /favicon.ico HTTP/1.1\r\n\r\n"))
            .await
            .unwrap();
        assert_eq!(content, DEFAULT_CONTENT);
        assert_eq!(server.source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_request_line_is_default() {
        let server = server(StubSource::new(0.0, 0.0, 0.0));
        let content = server.content_for(&parse(b"")).await.unwrap();
        assert_eq!(content, DEFAULT_CONTENT);
        assert_eq!(server.source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn classifies_fetched_averages() {
        let server = server(StubSource::new(2.0, 3.0, 1.0));
        let content = server
            .content_for(&parse(b"GET /http://img/black.png HTTP/1.1\r\n\r\n"))
            .await
            .unwrap();
        assert_eq!(content, "black");
    }

    #[tokio::test]
    async fn fetch_failure_is_no_match() {
        let server = server(StubSource::new(2.0, 3.0, 1.0));
        let content = server
            .content_for(&parse(b"GET /broken HTTP/1.1\r\n\r\n"))
            .await
            .unwrap();
        assert_eq!(content, NO_MATCH);
    }

    #[tokio::test]
    async fn missing_target_is_an_error() {
        let server = server(StubSource::new(0.0, 0.0, 0.0));
        assert!(server.content_for(&parse(b"GET\r\n\r\n")).await.is_err());
    }

    #[tokio::test]
    async fn full_exchange_over_duplex() {
        let server = server(StubSource::new(250.0, 5.0, 5.0));
        let (mut client, stream) = tokio::io::duplex(16 * 1024);
        let conn = Connection::new(stream, "127.0.0.1:50002".parse().unwrap());

        client
            .write_all(b"GET /http://img/red.png HTTP/1.1\r\nHost: x\r\n\r\n")
            .await
            .unwrap();
        server.serve_connection(conn).await;

        let mut received = String::new();
        client.read_to_string(&mut received).await.unwrap();
        assert_eq!(received, response::render("red"));
    }

    #[tokio::test]
    async fn dropped_shutdown_keeps_serving() {
        use crate::config::ListenerConfig;
        use crate::lifecycle::Shutdown;
        use tokio::net::TcpStream;

        let listener = Listener::bind(&ListenerConfig {
            bind_address: "127.0.0.1:0".into(),
            backlog: 4,
        })
        .await
        .unwrap();
        let addr = listener.local_addr().unwrap();

        let shutdown = Shutdown::new();
        let rx = shutdown.subscribe();
        drop(shutdown);

        let server = server(StubSource::new(2.0, 3.0, 1.0));
        let handle = tokio::spawn(async move { server.run(listener, rx).await });

        let mut client = TcpStream::connect(addr).await.unwrap();
        client
            .write_all(b"GET /http://img/black.png HTTP/1.1\r\n\r\n")
            .await
            .unwrap();
        client.shutdown().await.unwrap();
        let mut received = String::new();
        client.read_to_string(&mut received).await.unwrap();

        assert_eq!(received, response::render("black"));
        assert!(!handle.is_finished());
        handle.abort();
    }

    #[tokio::test]
    async fn trigger_stops_accept_loop() {
        use crate::config::ListenerConfig;
        use crate::lifecycle::Shutdown;

        let listener = Listener::bind(&ListenerConfig {
            bind_address: "127.0.0.1:0".into(),
            backlog: 4,
        })
        .await
        .unwrap();
        let shutdown = Shutdown::new();
        let rx = shutdown.subscribe();

        let server = server(StubSource::new(0.0, 0.0, 0.0));
        let handle = tokio::spawn(async move { server.run(listener, rx).await });

        shutdown.trigger();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn extreme_content_length_does_not_panic() {
        let server = server(StubSource::new(0.0, 0.0, 0.0));
        let (mut client, stream) = tokio::io::duplex(16 * 1024);
        let conn = Connection::new(stream, "127.0.0.1:50004".parse().unwrap());

        client
            .write_all(b"POST /x HTTP/1.1\r\nContent-Length: -9223372036854775808\r\n\r\nb")
            .await
            .unwrap();
        server.serve_connection(conn).await;

        let mut received = Vec::new();
        client.read_to_end(&mut received).await.unwrap();
        assert!(received.is_empty());
    }

    #[tokio::test]
    async fn malformed_request_closes_without_response() {
        let server = server(StubSource::new(0.0, 0.0, 0.0));
        let (mut client, stream) = tokio::io::duplex(16 * 1024);
        let conn = Connection::new(stream, "127.0.0.1:50003".parse().unwrap());

        client
            .write_all(b"GET /x HTTP/1.1\r\nno separator\r\n\r\n")
            .await
            .unwrap();
        server.serve_connection(conn).await;

        let mut received = Vec::new();
        client.read_to_end(&mut received).await.unwrap();
        assert!(received.is_empty());
        assert_eq!(server.source.calls.load(Ordering::SeqCst), 0);
    }
}
