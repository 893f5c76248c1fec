//! Coordinator end to end: live WebSocket, manual SSE, real polling

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rdm_sync::client::realtime::{fetch_fn, RealtimeOptions, Trigger};
use rdm_sync::client::transport::{ManualTransport, ReconnectPolicy, WebSocketClient};
use rdm_sync::client::SyncContext;
use rdm_sync::shared::SseEvent;
use serde_json::json;

use crate::common::assertions::eventually;
use crate::common::spawn_ws_server;

const WAIT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn test_websocket_takes_over_from_polling() {
    let server = spawn_ws_server().await;
    let websocket = WebSocketClient::with_policy(&server.url, ReconnectPolicy::disabled());
    let sse = ManualTransport::<SseEvent>::new();
    let sync = SyncContext::with_transports(Arc::new(websocket.clone()), Arc::new(sse));

    let polled = Arc::new(AtomicUsize::new(0));
    let pushed = Arc::new(AtomicUsize::new(0));
    let (p, w) = (polled.clone(), pushed.clone());
    let session = sync.coordinator().subscribe(
        "wallet",
        fetch_fn(move |ticket| {
            match ticket.trigger() {
                Trigger::Polling => p.fetch_add(1, Ordering::SeqCst),
                _ => w.fetch_add(1, Ordering::SeqCst),
            };
            async move {
                ticket.try_commit();
                Ok(())
            }
        }),
        RealtimeOptions::default().polling_interval(Duration::from_millis(50)),
    );

    eventually(WAIT, || polled.load(Ordering::SeqCst) >= 1, "polling fallback").await;

    session.connect();
    eventually(WAIT, || !session.status().polling, "polling stopped").await;
    assert!(session.is_active());

    server.broadcast(json!({"type": "wallet"}).to_string());
    eventually(WAIT, || pushed.load(Ordering::SeqCst) == 1, "push-triggered fetch").await;

    session.disconnect();
    assert!(sync.polling().is_polling(session.polling_key()));
    assert!(session.status().last_refresh.is_some());
}

#[tokio::test]
async fn test_closed_session_ignores_pushes() {
    let server = spawn_ws_server().await;
    let websocket = WebSocketClient::with_policy(&server.url, ReconnectPolicy::disabled());
    let sync = SyncContext::with_transports(
        Arc::new(websocket.clone()),
        Arc::new(ManualTransport::<SseEvent>::new()),
    );

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let session = sync.coordinator().subscribe(
        "goals",
        fetch_fn(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }
        }),
        RealtimeOptions::default().polling(false),
    );

    websocket.connect();
    eventually(WAIT, || websocket.is_connected(), "websocket connection").await;
    session.close();

    server.broadcast(json!({"type": "goals"}).to_string());
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    websocket.disconnect();
}
