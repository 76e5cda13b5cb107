//! Integration tests for the producer and listener WebSocket endpoints.

mod helpers;

use std::time::Duration;

use axum::http::StatusCode;
use futures::SinkExt;
use tokio_tungstenite::tungstenite::{self, Message};

use voxrelay_core::types::DeviceKey;
use voxrelay_realtime::Role;

use helpers::{TestApp, connect, next_data, wait_for, ws_url};

const WAIT: Duration = Duration::from_secs(2);
const QUIET: Duration = Duration::from_millis(200);

fn key(raw: &str) -> DeviceKey {
    DeviceKey::parse(raw).unwrap()
}

#[tokio::test]
async fn test_frame_reaches_listener_of_same_key_only() {
    let app = TestApp::new();
    let addr = app.spawn().await;
    let registry = app.engine.registry.clone();

    let mut listener1 = connect(addr, "/ws/listen", "dev1").await;
    let mut listener2 = connect(addr, "/ws/listen", "dev2").await;
    let mut producer = connect(addr, "/ws/device", "dev1").await;
    wait_for(|| {
        registry.listener_count(&key("dev1")) == 1
            && registry.listener_count(&key("dev2")) == 1
            && registry.current_producer(&key("dev1")).is_some()
    })
    .await;

    producer
        .send(Message::Binary(vec![0u8; 320].into()))
        .await
        .unwrap();

    match next_data(&mut listener1, WAIT).await {
        Some(Message::Binary(data)) => {
            assert_eq!(data.len(), 320);
            assert!(data.iter().all(|b| *b == 0));
        }
        other => panic!("expected a binary frame, got {other:?}"),
    }
    assert!(next_data(&mut listener2, QUIET).await.is_none());
}

#[tokio::test]
async fn test_wrong_length_frames_are_not_forwarded() {
    let app = TestApp::new();
    let addr = app.spawn().await;
    let registry = app.engine.registry.clone();

    let mut listener = connect(addr, "/ws/listen", "dev1").await;
    let mut producer = connect(addr, "/ws/device", "dev1").await;
    wait_for(|| {
        registry.listener_count(&key("dev1")) == 1
            && registry.current_producer(&key("dev1")).is_some()
    })
    .await;

    for len in [0usize, 319, 321, 1024] {
        producer
            .send(Message::Binary(vec![1u8; len].into()))
            .await
            .unwrap();
    }
    producer
        .send(Message::Binary(vec![7u8; 320].into()))
        .await
        .unwrap();

    match next_data(&mut listener, WAIT).await {
        Some(Message::Binary(data)) => {
            assert_eq!(data.len(), 320);
            assert!(data.iter().all(|b| *b == 7));
        }
        other => panic!("expected the valid frame, got {other:?}"),
    }
    assert_eq!(app.engine.metrics.snapshot().frames_rejected, 4);
}

#[tokio::test]
async fn test_second_producer_replaces_first() {
    let app = TestApp::new();
    let addr = app.spawn().await;
    let registry = app.engine.registry.clone();

    let mut first = connect(addr, "/ws/device", "dev1").await;
    wait_for(|| registry.current_producer(&key("dev1")).is_some()).await;
    let first_id = registry.current_producer(&key("dev1")).unwrap().id;

    let _second = connect(addr, "/ws/device", "dev1").await;
    wait_for(|| {
        registry
            .current_producer(&key("dev1"))
            .is_some_and(|p| p.id != first_id)
    })
    .await;

    match next_data(&mut first, WAIT).await {
        Some(Message::Close(Some(frame))) => assert_eq!(u16::from(frame.code), 4000),
        other => panic!("expected a close frame, got {other:?}"),
    }

    // The evicted producer's cleanup must not unregister its replacement.
    wait_for(|| app.engine.connections.count_by_role(Role::Producer) == 1).await;
    assert!(registry.current_producer(&key("dev1")).is_some());
    assert_eq!(app.engine.metrics.snapshot().producers_replaced, 1);
}

#[tokio::test]
async fn test_closed_listener_is_removed() {
    let app = TestApp::new();
    let addr = app.spawn().await;
    let registry = app.engine.registry.clone();

    let mut listener = connect(addr, "/ws/listen", "dev1").await;
    wait_for(|| registry.listener_count(&key("dev1")) == 1).await;

    listener.close(None).await.unwrap();

    wait_for(|| !registry.has_listener_entry(&key("dev1"))).await;
    wait_for(|| app.engine.connections.connection_count() == 0).await;
}

#[tokio::test]
async fn test_bad_token_is_rejected_before_upgrade() {
    let app = TestApp::new();
    let addr = app.spawn().await;

    let url = ws_url(addr, "/ws/device", "dev1", "wrong");
    match tokio_tungstenite::connect_async(url).await {
        Err(tungstenite::Error::Http(response)) => {
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED)
        }
        other => panic!("expected an HTTP rejection, got {:?}", other.map(|_| ())),
    }
    assert_eq!(app.engine.registry.producer_count(), 0);
}

#[tokio::test]
async fn test_missing_key_is_rejected() {
    let app = TestApp::new();
    let addr = app.spawn().await;

    let url = format!("ws://{addr}/ws/listen?token={}", helpers::TOKEN);
    match tokio_tungstenite::connect_async(url).await {
        Err(tungstenite::Error::Http(response)) => {
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED)
        }
        other => panic!("expected an HTTP rejection, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_unknown_endpoint_is_not_found() {
    let app = TestApp::new();
    let addr = app.spawn().await;

    let url = ws_url(addr, "/ws/other", "dev1", helpers::TOKEN);
    match tokio_tungstenite::connect_async(url).await {
        Err(tungstenite::Error::Http(response)) => {
            assert_eq!(response.status(), StatusCode::NOT_FOUND)
        }
        other => panic!("expected an HTTP rejection, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_admin_command_reaches_producer() {
    let app = TestApp::new();
    let addr = app.spawn().await;
    let registry = app.engine.registry.clone();

    let mut producer = connect(addr, "/ws/device", "dev1").await;
    wait_for(|| registry.current_producer(&key("dev1")).is_some()).await;

    let response = app
        .request(
            "POST",
            &format!("/api/devices/dev1/wifi?token={}", helpers::TOKEN),
            Some(r#"{"ssid":"home","pass":"hunter22","apply":true}"#),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    match next_data(&mut producer, WAIT).await {
        Some(Message::Text(text)) => {
            let value: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
            assert_eq!(value["type"], "set_wifi");
            assert_eq!(value["ssid"], "home");
            assert_eq!(value["pass"], "hunter22");
            assert_eq!(value["apply"], true);
        }
        other => panic!("expected a text command, got {other:?}"),
    }

    producer
        .send(Message::text(r#"{"type":"wifi_ack","ok":true,"ssid":"home"}"#))
        .await
        .unwrap();
    let metrics = app.engine.metrics.clone();
    wait_for(|| metrics.snapshot().device_reports == 1).await;
}

#[tokio::test]
async fn test_listener_input_is_ignored() {
    let app = TestApp::new();
    let addr = app.spawn().await;
    let registry = app.engine.registry.clone();

    let mut talker = connect(addr, "/ws/listen", "dev1").await;
    let mut other = connect(addr, "/ws/listen", "dev1").await;
    wait_for(|| registry.listener_count(&key("dev1")) == 2).await;

    talker
        .send(Message::Binary(vec![0u8; 320].into()))
        .await
        .unwrap();

    assert!(next_data(&mut other, QUIET).await.is_none());
    assert_eq!(registry.listener_count(&key("dev1")), 2);
}
