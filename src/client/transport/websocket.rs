//! WebSocket Client
//!
//! Maintains a single WebSocket connection and fans inbound `{type, payload}`
//! frames out to registered listeners. Text frames that are not a valid
//! envelope are dropped with a debug log.

use std::sync::{Arc, Mutex};

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

use crate::client::listeners::{Listeners, Subscription};
use crate::client::lock;
use crate::client::transport::{
    ConnectionStatus, FrameCallback, ReconnectPolicy, StatusCallback, StatusCell, Transport,
    TransportError,
};
use crate::shared::WsMessage;

struct WsInner {
    url: String,
    policy: ReconnectPolicy,
    status: StatusCell,
    messages: Listeners<WsMessage>,
    outbound: Mutex<Option<(u64, mpsc::UnboundedSender<Message>)>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

/// WebSocket transport client
#[derive(Clone)]
pub struct WebSocketClient {
    inner: Arc<WsInner>,
}

impl WebSocketClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_policy(url, ReconnectPolicy::default())
    }

    pub fn with_policy(url: impl Into<String>, policy: ReconnectPolicy) -> Self {
        Self {
            inner: Arc::new(WsInner {
                url: url.into(),
                policy,
                status: StatusCell::new(),
                messages: Listeners::new(),
                outbound: Mutex::new(None),
                task: Mutex::new(None),
            }),
        }
    }

    pub fn url(&self) -> &str {
        &self.inner.url
    }

    /// Open the connection in the background. Must be called from within a
    /// tokio runtime.
    pub fn connect(&self) {
        let Some(generation) = self.inner.status.begin() else {
            tracing::debug!(url = %self.inner.url, "websocket connect ignored: already active");
            return;
        };

        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            run_connection(inner, generation).await;
        });
        if let Some(previous) = lock(&self.inner.task).replace(handle) {
            previous.abort();
        }
    }

    pub fn disconnect(&self) {
        self.inner.status.end();
        if let Some(handle) = lock(&self.inner.task).take() {
            handle.abort();
        }
        lock(&self.inner.outbound).take();
    }

    pub fn status(&self) -> ConnectionStatus {
        self.inner.status.get()
    }

    pub fn is_connected(&self) -> bool {
        self.status() == ConnectionStatus::Connected
    }

    pub fn on_status_change<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&ConnectionStatus) + Send + Sync + 'static,
    {
        self.inner.status.subscribe(callback)
    }

    pub fn on_message<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&WsMessage) + Send + Sync + 'static,
    {
        self.inner.messages.add(callback)
    }

    /// Queue an outbound envelope on the live connection
    pub fn send(&self, message: &WsMessage) -> Result<(), TransportError> {
        let text = message.to_text()?;
        let outbound = lock(&self.inner.outbound);
        let (_, sender) = outbound.as_ref().ok_or(TransportError::NotConnected)?;
        sender
            .send(Message::Text(text.into()))
            .map_err(|_| TransportError::NotConnected)
    }
}

impl Transport for WebSocketClient {
    type Frame = WsMessage;

    fn connect(&self) {
        WebSocketClient::connect(self)
    }

    fn disconnect(&self) {
        WebSocketClient::disconnect(self)
    }

    fn status(&self) -> ConnectionStatus {
        WebSocketClient::status(self)
    }

    fn on_status_change(&self, callback: StatusCallback) -> Subscription {
        WebSocketClient::on_status_change(self, callback)
    }

    fn on_frame(&self, callback: FrameCallback<WsMessage>) -> Subscription {
        self.on_message(callback)
    }
}

impl std::fmt::Debug for WebSocketClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebSocketClient")
            .field("url", &self.inner.url)
            .field("status", &self.inner.status.get())
            .finish()
    }
}

/// Connection loop for one generation: connect, read until the socket
/// closes, then back off and retry while the policy allows.
async fn run_connection(inner: Arc<WsInner>, generation: u64) {
    let mut attempt: u32 = 0;

    loop {
        tracing::info!(url = %inner.url, "connecting websocket");
        match connect_async(inner.url.as_str()).await {
            Ok((stream, _response)) => {
                attempt = 0;
                if !inner.status.set_for(generation, ConnectionStatus::Connected) {
                    return;
                }
                tracing::info!(url = %inner.url, "websocket connected");

                let (mut sink, mut source) = stream.split();
                let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
                *lock(&inner.outbound) = Some((generation, tx));

                let outcome: Result<(), String> = loop {
                    tokio::select! {
                        frame = source.next() => match frame {
                            Some(Ok(Message::Text(text))) => dispatch(&inner, text.as_str()),
                            Some(Ok(Message::Close(frame))) => {
                                tracing::info!(?frame, "websocket closed by server");
                                break Ok(());
                            }
                            Some(Ok(_)) => {}
                            Some(Err(e)) => break Err(e.to_string()),
                            None => break Ok(()),
                        },
                        Some(outgoing) = rx.recv() => {
                            if let Err(e) = sink.send(outgoing).await {
                                break Err(e.to_string());
                            }
                        }
                    }
                };

                {
                    let mut outbound = lock(&inner.outbound);
                    if matches!(outbound.as_ref(), Some((owner, _)) if *owner == generation) {
                        outbound.take();
                    }
                }

                if let Err(e) = outcome {
                    tracing::error!(url = %inner.url, error = %e, "websocket connection lost");
                    inner.status.set_for(generation, ConnectionStatus::Error);
                }
                if !inner.status.set_for(generation, ConnectionStatus::Disconnected) {
                    return;
                }
            }
            Err(e) => {
                tracing::warn!(url = %inner.url, error = %e, "websocket connect failed");
                inner.status.set_for(generation, ConnectionStatus::Error);
                if !inner.status.set_for(generation, ConnectionStatus::Disconnected) {
                    return;
                }
            }
        }

        if attempt >= inner.policy.max_attempts {
            tracing::info!(url = %inner.url, attempts = attempt, "websocket reconnect budget exhausted");
            return;
        }
        let delay = inner.policy.delay_for(attempt);
        attempt += 1;
        tracing::debug!(delay_ms = delay.as_millis() as u64, attempt, "websocket reconnect scheduled");
        tokio::time::sleep(delay).await;

        if !inner.status.is_current(generation)
            || !inner.status.set_for(generation, ConnectionStatus::Connecting)
        {
            return;
        }
    }
}

fn dispatch(inner: &WsInner, text: &str) {
    match WsMessage::from_text(text) {
        Ok(message) => {
            tracing::debug!(message_type = %message.message_type, "websocket frame");
            inner.messages.emit(&message);
        }
        Err(e) => {
            tracing::debug!(error = %e, "ignoring websocket frame without envelope");
        }
    }
}
