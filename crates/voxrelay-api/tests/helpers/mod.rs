//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures::StreamExt;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tower::ServiceExt;

use voxrelay_api::{AppState, build_app};
use voxrelay_core::config::{AppConfig, AuthConfig};
use voxrelay_realtime::RelayEngine;

/// Token accepted by every test app.
pub const TOKEN: &str = "test-token";

/// Client side of a test WebSocket.
pub type TestSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Test application context
pub struct TestApp {
    /// The Axum router for in-process requests
    pub router: Router,
    /// The engine behind the router
    pub engine: Arc<RelayEngine>,
}

/// Parsed response of an in-process request
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

pub fn test_config() -> AppConfig {
    AppConfig {
        auth: AuthConfig {
            tokens: vec![TOKEN.to_string()],
        },
        ..AppConfig::default()
    }
}

impl TestApp {
    /// Create a new test application
    pub fn new() -> Self {
        let config = test_config();
        let engine = Arc::new(RelayEngine::new(config.realtime.clone(), &config.auth));
        let cors = config.server.cors.clone();
        let router = build_app(AppState::new(config, engine.clone()), &cors);
        Self { router, engine }
    }

    /// Send a request through the router without a socket
    pub async fn request(&self, method: &str, uri: &str, body: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header("content-type", "application/json");
        }
        let request = builder
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Serve the app on an ephemeral local port
    pub async fn spawn(&self) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = self.router.clone();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }
}

pub fn ws_url(addr: SocketAddr, path: &str, key: &str, token: &str) -> String {
    format!("ws://{addr}{path}?key={key}&token={token}")
}

/// Connect with the shared token; panics if the handshake fails.
pub async fn connect(addr: SocketAddr, path: &str, key: &str) -> TestSocket {
    let (socket, _) = tokio_tungstenite::connect_async(ws_url(addr, path, key, TOKEN))
        .await
        .unwrap();
    socket
}

/// Poll `check` until it holds or two seconds pass.
pub async fn wait_for(mut check: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !check() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached in time"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Next non-ping message, or `None` if nothing arrives in time.
pub async fn next_data(socket: &mut TestSocket, wait: Duration) -> Option<Message> {
    let deadline = tokio::time::Instant::now() + wait;
    loop {
        let next = tokio::time::timeout_at(deadline, socket.next()).await.ok()??;
        match next.ok()? {
            Message::Ping(_) | Message::Pong(_) => continue,
            msg => return Some(msg),
        }
    }
}
