//! Shared utilities for integration testing.
#![allow(dead_code)]

use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use color_probe::config::ServiceConfig;
use color_probe::net::Listener;
use color_probe::{ColorServer, Shutdown};

/// Encode a uniform PNG of the given color.
pub fn solid_png(rgb: [u8; 3]) -> Vec<u8> {
    let image = RgbImage::from_pixel(16, 16, Rgb(rgb));
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

/// Start a mock image backend. `route` maps a request path to (status, body).
pub async fn start_image_backend<F>(route: F) -> SocketAddr
where
    F: Fn(&str) -> (u16, Vec<u8>) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let route = Arc::new(route);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let route = route.clone();
                    tokio::spawn(async move {
                        let head = read_head(&mut socket).await;
                        let path = head.split(' ').nth(1).unwrap_or("/").to_string();
                        let (status, body) = route(&path);
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            _ => "200 OK",
                        };

                        let head = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                            status_text,
                            body.len()
                        );
                        let _ = socket.write_all(head.as_bytes()).await;
                        let _ = socket.write_all(&body).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

async fn read_head(socket: &mut TcpStream) -> String {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }
    String::from_utf8_lossy(&head).into_owned()
}

/// A running color probe on an ephemeral port.
pub struct RunningService {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<()>,
}

/// Start the service with `config`, overriding the bind address.
pub async fn start_service(mut config: ServiceConfig) -> RunningService {
    config.listener.bind_address = "127.0.0.1:0".into();
    config.listener.backlog = 16;
    config.fetch.use_system_proxy = false;

    let listener = Listener::bind(&config.listener).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = ColorServer::from_config(&config).unwrap();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    let handle = tokio::spawn(async move { server.run(listener, rx).await });

    RunningService {
        addr,
        shutdown,
        handle,
    }
}

/// Send raw request bytes, half-close, and read until the service closes
/// the connection.
pub async fn send_raw(addr: SocketAddr, request: &[u8]) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request).await.unwrap();
    stream.shutdown().await.unwrap();
    let mut out = Vec::new();
    stream.read_to_end(&mut out).await.unwrap();
    String::from_utf8(out).unwrap()
}

/// Ask the service to classify `url`.
pub async fn probe(addr: SocketAddr, url: &str) -> String {
    send_raw(addr, format!("GET /{url} HTTP/1.1\r\nHost: test\r\n\r\n").as_bytes()).await
}

/// Body of a rendered response.
pub fn content(response: &str) -> &str {
    response
        .split_once("\r\n\r\n")
        .map(|(_, body)| body)
        .unwrap_or("")
}
