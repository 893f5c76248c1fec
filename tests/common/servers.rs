//! Server helpers for integration tests

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::routing::get;
use axum::Router;
use rdm_sync::client::request::{RequestService, RetryPolicy};
use rdm_sync::client::rpc::{HttpRpcTransport, RpcClient};
use rdm_sync::client::Config;
use tokio::sync::{broadcast, mpsc};

/// Local WebSocket server at `{url}` (path `/ws`)
pub struct WsServer {
    pub url: String,
    outbound: broadcast::Sender<String>,
    pub inbound: mpsc::UnboundedReceiver<String>,
}

impl WsServer {
    /// Send a text frame to every connected client
    pub fn broadcast(&self, text: impl Into<String>) {
        let _ = self.outbound.send(text.into());
    }
}

pub async fn spawn_ws_server() -> WsServer {
    let (outbound, _) = broadcast::channel::<String>(64);
    let (inbound_tx, inbound) = mpsc::unbounded_channel::<String>();

    let sender = outbound.clone();
    let app = Router::new().route(
        "/ws",
        get(move |ws: WebSocketUpgrade| {
            let frames = sender.subscribe();
            let inbound = inbound_tx.clone();
            async move { ws.on_upgrade(move |socket| handle_socket(socket, frames, inbound)) }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    WsServer {
        url: format!("ws://{}/ws", addr),
        outbound,
        inbound,
    }
}

async fn handle_socket(
    mut socket: WebSocket,
    mut frames: broadcast::Receiver<String>,
    inbound: mpsc::UnboundedSender<String>,
) {
    loop {
        tokio::select! {
            frame = frames.recv() => match frame {
                Ok(text) => {
                    if socket.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    let _ = inbound.send(text.as_str().to_string());
                }
                Some(Ok(_)) => {}
                _ => break,
            },
        }
    }
}

/// Request service over HTTP RPC with a fast retry schedule
pub fn http_request_service(server_url: &str) -> RequestService {
    let config = Config::new(server_url).unwrap();
    let rpc = RpcClient::new(Arc::new(HttpRpcTransport::new(config)));
    RequestService::with_policy(
        rpc,
        RetryPolicy {
            attempts: 3,
            base_delay: Duration::from_millis(10),
        },
    )
}

/// A loopback address nothing listens on
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:9";
