//! WebSocket client against a local axum server

use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use rdm_sync::client::transport::{ConnectionStatus, ReconnectPolicy, WebSocketClient};
use rdm_sync::shared::WsMessage;
use serde_json::json;

use crate::common::assertions::eventually;
use crate::common::spawn_ws_server;

const WAIT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn test_receives_messages_in_order() {
    let server = spawn_ws_server().await;
    let client = WebSocketClient::with_policy(&server.url, ReconnectPolicy::disabled());

    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = received.clone();
    let _messages = client.on_message(move |message: &WsMessage| {
        sink.lock().unwrap().push(message.message_type.clone());
    });

    client.connect();
    eventually(WAIT, || client.is_connected(), "websocket connection").await;

    server.broadcast(json!({"type": "update", "payload": {"key": "wallet"}}).to_string());
    server.broadcast(json!({"type": "notification"}).to_string());
    eventually(WAIT, || received.lock().unwrap().len() == 2, "two messages").await;

    assert_eq!(*received.lock().unwrap(), vec!["update", "notification"]);
    client.disconnect();
}

#[tokio::test]
async fn test_malformed_frames_are_skipped() {
    let server = spawn_ws_server().await;
    let client = WebSocketClient::with_policy(&server.url, ReconnectPolicy::disabled());

    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = received.clone();
    let _messages = client.on_message(move |message: &WsMessage| {
        sink.lock().unwrap().push(message.message_type.clone());
    });

    client.connect();
    eventually(WAIT, || client.is_connected(), "websocket connection").await;

    server.broadcast("not json");
    server.broadcast(json!({"type": "update"}).to_string());
    eventually(WAIT, || !received.lock().unwrap().is_empty(), "valid message").await;

    assert_eq!(*received.lock().unwrap(), vec!["update"]);
    assert!(client.is_connected());
}

#[tokio::test]
async fn test_send_reaches_server() {
    let mut server = spawn_ws_server().await;
    let client = WebSocketClient::with_policy(&server.url, ReconnectPolicy::disabled());

    client.connect();
    eventually(WAIT, || client.is_connected(), "websocket connection").await;

    client
        .send(&WsMessage::new("subscribe", json!({"key": "goals"})))
        .unwrap();
    let text = tokio::time::timeout(WAIT, server.inbound.recv())
        .await
        .unwrap()
        .unwrap();

    let echoed = WsMessage::from_text(&text).unwrap();
    assert_eq!(echoed.message_type, "subscribe");
    assert_eq!(echoed.payload, json!({"key": "goals"}));
}

#[tokio::test]
async fn test_disconnect_sets_disconnected() {
    let server = spawn_ws_server().await;
    let client = WebSocketClient::with_policy(&server.url, ReconnectPolicy::disabled());

    client.connect();
    eventually(WAIT, || client.is_connected(), "websocket connection").await;

    client.disconnect();
    assert_eq!(client.status(), ConnectionStatus::Disconnected);
    assert!(client.send(&WsMessage::new("ping", json!(null))).is_err());
}

#[tokio::test]
async fn test_unreachable_server_reports_error_then_disconnected() {
    let client = WebSocketClient::with_policy("ws://127.0.0.1:9/ws", ReconnectPolicy::disabled());

    let statuses = Arc::new(Mutex::new(Vec::new()));
    let sink = statuses.clone();
    let _status = client.on_status_change(move |status: &ConnectionStatus| {
        sink.lock().unwrap().push(*status);
    });

    client.connect();
    eventually(WAIT, || statuses.lock().unwrap().len() == 3, "three transitions").await;

    assert_eq!(
        *statuses.lock().unwrap(),
        vec![
            ConnectionStatus::Connecting,
            ConnectionStatus::Error,
            ConnectionStatus::Disconnected
        ]
    );
}
