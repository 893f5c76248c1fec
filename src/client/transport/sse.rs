//! Server-Sent Events Client
//!
//! Holds one `text/event-stream` subscription open and dispatches every
//! complete event to registered listeners. The last seen event id is sent
//! back as `Last-Event-ID` when reconnecting.
//!
//! Framing is done by `eventsource-stream`. An `id:` in a block without
//! `data:` dispatches nothing but is carried on the next event, so it still
//! reaches `last_event_id`.

use std::sync::{Arc, Mutex};

use eventsource_stream::{Event, Eventsource};
use futures_util::StreamExt;
use reqwest::header::ACCEPT;
use reqwest::Client;
use tokio::task::JoinHandle;

use crate::client::listeners::{Listeners, Subscription};
use crate::client::lock;
use crate::client::transport::{
    ConnectionStatus, FrameCallback, ReconnectPolicy, StatusCallback, StatusCell, Transport,
};
use crate::shared::SseEvent;

struct SseInner {
    url: String,
    http: Client,
    policy: ReconnectPolicy,
    status: StatusCell,
    events: Listeners<SseEvent>,
    last_event_id: Mutex<Option<String>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

/// SSE transport client
#[derive(Clone)]
pub struct SseClient {
    inner: Arc<SseInner>,
}

impl SseClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_policy(url, ReconnectPolicy::default())
    }

    pub fn with_policy(url: impl Into<String>, policy: ReconnectPolicy) -> Self {
        Self {
            inner: Arc::new(SseInner {
                url: url.into(),
                http: Client::new(),
                policy,
                status: StatusCell::new(),
                events: Listeners::new(),
                last_event_id: Mutex::new(None),
                task: Mutex::new(None),
            }),
        }
    }

    pub fn url(&self) -> &str {
        &self.inner.url
    }

    /// Open the stream in the background. Must be called from within a
    /// tokio runtime.
    pub fn connect(&self) {
        let Some(generation) = self.inner.status.begin() else {
            tracing::debug!(url = %self.inner.url, "sse connect ignored: already active");
            return;
        };

        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            run_stream(inner, generation).await;
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

    pub fn on_event<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&SseEvent) + Send + Sync + 'static,
    {
        self.inner.events.add(callback)
    }

    /// Id of the last event received, if the server sends ids
    pub fn last_event_id(&self) -> Option<String> {
        lock(&self.inner.last_event_id).clone()
    }
}

impl Transport for SseClient {
    type Frame = SseEvent;

    fn connect(&self) {
        SseClient::connect(self)
    }

    fn disconnect(&self) {
        SseClient::disconnect(self)
    }

    fn status(&self) -> ConnectionStatus {
        SseClient::status(self)
    }

    fn on_status_change(&self, callback: StatusCallback) -> Subscription {
        SseClient::on_status_change(self, callback)
    }

    fn on_frame(&self, callback: FrameCallback<SseEvent>) -> Subscription {
        self.on_event(callback)
    }
}

impl std::fmt::Debug for SseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SseClient")
            .field("url", &self.inner.url)
            .field("status", &self.inner.status.get())
            .finish()
    }
}

async fn run_stream(inner: Arc<SseInner>, generation: u64) {
    let mut attempt: u32 = 0;

    loop {
        let mut request = inner.http.get(&inner.url).header(ACCEPT, "text/event-stream");
        if let Some(id) = lock(&inner.last_event_id).clone() {
            request = request.header("Last-Event-ID", id);
        }

        tracing::info!(url = %inner.url, "subscribing to event stream");
        match request.send().await {
            Ok(response) if response.status().is_success() => {
                attempt = 0;
                if !inner.status.set_for(generation, ConnectionStatus::Connected) {
                    return;
                }
                tracing::info!(url = %inner.url, "event stream established");

                let mut stream = response.bytes_stream().eventsource();
                let mut failure: Option<String> = None;

                while let Some(item) = stream.next().await {
                    match item {
                        Ok(event) => {
                            let event = sse_event(event);
                            if let Some(id) = event.id.as_ref() {
                                *lock(&inner.last_event_id) = Some(id.clone());
                            }
                            tracing::debug!(event = ?event.event, "sse event");
                            inner.events.emit(&event);
                        }
                        Err(e) => {
                            failure = Some(e.to_string());
                            break;
                        }
                    }
                }

                match failure {
                    Some(e) => {
                        tracing::error!(url = %inner.url, error = %e, "event stream lost");
                        inner.status.set_for(generation, ConnectionStatus::Error);
                    }
                    None => tracing::info!(url = %inner.url, "event stream closed by server"),
                }
                if !inner.status.set_for(generation, ConnectionStatus::Disconnected) {
                    return;
                }
            }
            Ok(response) => {
                tracing::warn!(url = %inner.url, status = %response.status(), "event stream rejected");
                inner.status.set_for(generation, ConnectionStatus::Error);
                if !inner.status.set_for(generation, ConnectionStatus::Disconnected) {
                    return;
                }
            }
            Err(e) => {
                tracing::warn!(url = %inner.url, error = %e, "event stream request failed");
                inner.status.set_for(generation, ConnectionStatus::Error);
                if !inner.status.set_for(generation, ConnectionStatus::Disconnected) {
                    return;
                }
            }
        }

        if attempt >= inner.policy.max_attempts {
            tracing::info!(url = %inner.url, attempts = attempt, "sse reconnect budget exhausted");
            return;
        }
        let delay = inner.policy.delay_for(attempt);
        attempt += 1;
        tracing::debug!(delay_ms = delay.as_millis() as u64, attempt, "sse reconnect scheduled");
        tokio::time::sleep(delay).await;

        if !inner.status.set_for(generation, ConnectionStatus::Connecting) {
            return;
        }
    }
}

/// Map a parsed stream event; the default `message` type and an empty id
/// become `None`.
fn sse_event(event: Event) -> SseEvent {
    SseEvent {
        event: Some(event.event).filter(|name| !name.is_empty() && name != "message"),
        data: event.data,
        id: Some(event.id).filter(|id| !id.is_empty()),
    }
}
