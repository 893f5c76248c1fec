//! # Realtime Coordinator
//!
//! Folds the WebSocket client, the SSE client and the polling service into
//! one "is live data flowing" signal per data key, plus a single refresh
//! entry point.
//!
//! ## Channel Policy
//!
//! - A WebSocket message whose `type` equals the data key or is one of the
//!   configured event types triggers a fetch
//! - An SSE event triggers a fetch when its JSON `type` matches the same
//!   rule, or when its data is not JSON at all (fail open)
//! - Polling runs only while polling is enabled and neither live transport
//!   is connected; it is a fallback, never a supplement
//! - `is_active` is true when polling is active or either transport is
//!   connected
//! - `refresh()` always fetches, whatever the channel state
//!
//! Each session polls under its own key (`"{data_key}#{n}"`), so several
//! sessions on one data key are polled independently and closing one leaves
//! the others running. Dropping a [`RealtimeSession`] removes its listeners
//! and stops its polling; no channel invokes the fetch function afterwards.
//!
//! ## Fencing
//!
//! Every fetch receives a [`FetchTicket`]. Call
//! [`FetchTicket::try_commit`] before applying a result: it refuses results
//! older than one already applied for the same key, and results arriving
//! after the session closed.

pub mod fence;

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::future::{BoxFuture, FutureExt};

use crate::client::listeners::Subscription;
use crate::client::lock;
use crate::client::polling::{PollFn, PollingService};
use crate::client::request::RequestError;
use crate::client::transport::{ConnectionStatus, Transport};
use crate::shared::{SseData, SseEvent, WsMessage};

pub use fence::{FetchTicket, SequenceFence, Trigger};

/// Default polling interval
pub const DEFAULT_POLLING_INTERVAL: Duration = Duration::from_millis(5000);

/// Default event types that trigger a refresh
pub const DEFAULT_EVENT_TYPES: [&str; 2] = ["update", "notification"];

/// Caller's fetch function
pub type FetchFn =
    Arc<dyn Fn(FetchTicket) -> BoxFuture<'static, Result<(), RequestError>> + Send + Sync>;

/// Shared WebSocket transport handle
pub type WsTransport = Arc<dyn Transport<Frame = WsMessage>>;

/// Shared SSE transport handle
pub type SseTransport = Arc<dyn Transport<Frame = SseEvent>>;

/// Wrap an async closure as a [`FetchFn`]
pub fn fetch_fn<F, Fut>(f: F) -> FetchFn
where
    F: Fn(FetchTicket) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), RequestError>> + Send + 'static,
{
    Arc::new(move |ticket: FetchTicket| {
        Box::pin(f(ticket)) as BoxFuture<'static, Result<(), RequestError>>
    })
}

/// Per-subscription channel configuration
#[derive(Debug, Clone)]
pub struct RealtimeOptions {
    pub use_websocket: bool,
    pub use_sse: bool,
    pub use_polling: bool,
    pub polling_interval: Duration,
    pub event_types: Vec<String>,
}

impl Default for RealtimeOptions {
    fn default() -> Self {
        Self {
            use_websocket: true,
            use_sse: true,
            use_polling: true,
            polling_interval: DEFAULT_POLLING_INTERVAL,
            event_types: DEFAULT_EVENT_TYPES.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl RealtimeOptions {
    pub fn websocket(mut self, enabled: bool) -> Self {
        self.use_websocket = enabled;
        self
    }

    pub fn sse(mut self, enabled: bool) -> Self {
        self.use_sse = enabled;
        self
    }

    pub fn polling(mut self, enabled: bool) -> Self {
        self.use_polling = enabled;
        self
    }

    pub fn polling_interval(mut self, interval: Duration) -> Self {
        self.polling_interval = interval;
        self
    }

    pub fn event_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.event_types = types.into_iter().map(Into::into).collect();
        self
    }
}

/// Polling runs iff enabled and no live transport is connected
pub fn should_poll(use_polling: bool, websocket_connected: bool, sse_connected: bool) -> bool {
    use_polling && !websocket_connected && !sse_connected
}

/// Whether a message type is relevant to `data_key`
pub fn matches_key(message_type: &str, data_key: &str, event_types: &[String]) -> bool {
    message_type == data_key || event_types.iter().any(|t| t == message_type)
}

/// SSE refresh rule: unparseable data always refreshes
pub fn sse_should_refresh(data: &SseData, data_key: &str, event_types: &[String]) -> bool {
    match data {
        SseData::Unparseable(_) => true,
        SseData::Parsed(_) => data
            .event_type()
            .is_some_and(|t| matches_key(t, data_key, event_types)),
    }
}

/// Snapshot of a session's channels
#[derive(Debug, Clone, PartialEq)]
pub struct RealtimeStatus {
    pub websocket: ConnectionStatus,
    pub sse: ConnectionStatus,
    /// Whether this session's key is being polled
    pub polling: bool,
    /// Some channel is keeping data fresh
    pub is_active: bool,
    /// Time of the last committed fetch for this key
    pub last_refresh: Option<DateTime<Utc>>,
}

/// Composes the transports and the polling service
pub struct RealtimeCoordinator {
    websocket: WsTransport,
    sse: SseTransport,
    polling: Arc<PollingService>,
    fences: Mutex<HashMap<String, Arc<SequenceFence>>>,
    next_session: AtomicU64,
}

impl RealtimeCoordinator {
    pub fn new(websocket: WsTransport, sse: SseTransport, polling: Arc<PollingService>) -> Self {
        Self {
            websocket,
            sse,
            polling,
            fences: Mutex::new(HashMap::new()),
            next_session: AtomicU64::new(1),
        }
    }

    pub fn websocket(&self) -> &WsTransport {
        &self.websocket
    }

    pub fn sse(&self) -> &SseTransport {
        &self.sse
    }

    pub fn polling(&self) -> &Arc<PollingService> {
        &self.polling
    }

    /// Fence shared by every session on `data_key`
    pub fn fence_for(&self, data_key: &str) -> Arc<SequenceFence> {
        Arc::clone(
            lock(&self.fences)
                .entry(data_key.to_string())
                .or_insert_with(|| Arc::new(SequenceFence::new())),
        )
    }

    /// Start keeping `data_key` fresh. Must be called from within a tokio
    /// runtime; the session tears down when dropped.
    pub fn subscribe(
        &self,
        data_key: impl Into<String>,
        fetch: FetchFn,
        options: RealtimeOptions,
    ) -> RealtimeSession {
        let data_key = data_key.into();
        let session_id = self.next_session.fetch_add(1, Ordering::Relaxed);
        let shared = Arc::new(SessionShared {
            fence: self.fence_for(&data_key),
            polling_key: format!("{data_key}#{session_id}"),
            data_key,
            options,
            fetch,
            alive: Arc::new(AtomicBool::new(true)),
            websocket: Arc::clone(&self.websocket),
            sse: Arc::clone(&self.sse),
            polling: Arc::clone(&self.polling),
            evaluate: Mutex::new(()),
        });

        let mut subscriptions = Vec::new();

        if shared.options.use_websocket {
            let weak = Arc::downgrade(&shared);
            subscriptions.push(self.websocket.on_frame(Box::new(move |message: &WsMessage| {
                if let Some(shared) = weak.upgrade() {
                    if matches_key(&message.message_type, &shared.data_key, &shared.options.event_types) {
                        shared.trigger(Trigger::WebSocket);
                    }
                }
            })));
            subscriptions.push(self.websocket.on_status_change(status_listener(&shared)));
        }

        if shared.options.use_sse {
            let weak = Arc::downgrade(&shared);
            subscriptions.push(self.sse.on_frame(Box::new(move |event: &SseEvent| {
                if let Some(shared) = weak.upgrade() {
                    let data = event.parse_data();
                    if let SseData::Unparseable(_) = data {
                        tracing::debug!(key = %shared.data_key, "unparseable sse data, refreshing anyway");
                    }
                    if sse_should_refresh(&data, &shared.data_key, &shared.options.event_types) {
                        shared.trigger(Trigger::Sse);
                    }
                }
            })));
            subscriptions.push(self.sse.on_status_change(status_listener(&shared)));
        }

        shared.evaluate_polling();
        tracing::debug!(key = %shared.data_key, "realtime session opened");

        RealtimeSession {
            shared,
            subscriptions,
        }
    }
}

impl std::fmt::Debug for RealtimeCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeCoordinator")
            .field("websocket", &self.websocket.status())
            .field("sse", &self.sse.status())
            .field("polling", &self.polling)
            .finish()
    }
}

fn status_listener(shared: &Arc<SessionShared>) -> Box<dyn Fn(&ConnectionStatus) + Send + Sync> {
    let weak: Weak<SessionShared> = Arc::downgrade(shared);
    Box::new(move |_status| {
        if let Some(shared) = weak.upgrade() {
            shared.evaluate_polling();
        }
    })
}

struct SessionShared {
    data_key: String,
    polling_key: String,
    options: RealtimeOptions,
    fetch: FetchFn,
    fence: Arc<SequenceFence>,
    alive: Arc<AtomicBool>,
    websocket: WsTransport,
    sse: SseTransport,
    polling: Arc<PollingService>,
    evaluate: Mutex<()>,
}

impl SessionShared {
    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    fn ticket(&self, trigger: Trigger) -> FetchTicket {
        FetchTicket::new(trigger, Arc::clone(&self.fence), Arc::clone(&self.alive))
    }

    fn is_polling(&self) -> bool {
        self.polling.is_polling(&self.polling_key)
    }

    fn websocket_connected(&self) -> bool {
        self.options.use_websocket && self.websocket.is_connected()
    }

    fn sse_connected(&self) -> bool {
        self.options.use_sse && self.sse.is_connected()
    }

    /// Fire-and-forget fetch from a push channel
    fn trigger(&self, trigger: Trigger) {
        if !self.is_alive() {
            return;
        }
        let key = self.data_key.clone();
        let fetch = (self.fetch)(self.ticket(trigger));
        tokio::spawn(async move {
            if let Err(e) = fetch.await {
                tracing::warn!(%key, ?trigger, error = %e, "realtime fetch failed");
            }
        });
    }

    fn evaluate_polling(self: &Arc<Self>) {
        let _evaluate = lock(&self.evaluate);
        if !self.is_alive() {
            return;
        }

        let poll = should_poll(
            self.options.use_polling,
            self.websocket_connected(),
            self.sse_connected(),
        );
        let polling_now = self.is_polling();

        if poll && !polling_now {
            tracing::info!(key = %self.polling_key, "no live transport, falling back to polling");
            self.polling
                .start(self.polling_key.clone(), self.poll_fn(), self.options.polling_interval);
        } else if !poll && polling_now {
            tracing::info!(key = %self.polling_key, "live transport connected, stopping polling");
            self.polling.stop(&self.polling_key);
        }
    }

    fn poll_fn(self: &Arc<Self>) -> PollFn {
        let weak = Arc::downgrade(self);
        Arc::new(move || match weak.upgrade() {
            Some(shared) if shared.is_alive() => (shared.fetch)(shared.ticket(Trigger::Polling)),
            _ => async { Ok(()) }.boxed(),
        })
    }
}

/// A live subscription for one data key. Dropping it tears it down.
pub struct RealtimeSession {
    shared: Arc<SessionShared>,
    subscriptions: Vec<Subscription>,
}

impl RealtimeSession {
    pub fn data_key(&self) -> &str {
        &self.shared.data_key
    }

    /// Key this session's task is registered under in the polling service
    pub fn polling_key(&self) -> &str {
        &self.shared.polling_key
    }

    pub fn options(&self) -> &RealtimeOptions {
        &self.shared.options
    }

    pub fn fence(&self) -> Arc<SequenceFence> {
        Arc::clone(&self.shared.fence)
    }

    /// Some channel is keeping data fresh
    pub fn is_active(&self) -> bool {
        self.shared.is_polling()
            || self.shared.websocket_connected()
            || self.shared.sse_connected()
    }

    pub fn status(&self) -> RealtimeStatus {
        RealtimeStatus {
            websocket: self.shared.websocket.status(),
            sse: self.shared.sse.status(),
            polling: self.shared.is_polling(),
            is_active: self.is_active(),
            last_refresh: self.shared.fence.last_commit(),
        }
    }

    /// Fetch now, regardless of channel state
    pub async fn refresh(&self) -> Result<(), RequestError> {
        let ticket = self.shared.ticket(Trigger::Manual);
        (self.shared.fetch)(ticket).await
    }

    /// Connect the enabled transports
    pub fn connect(&self) {
        if self.shared.options.use_websocket {
            self.shared.websocket.connect();
        }
        if self.shared.options.use_sse {
            self.shared.sse.connect();
        }
    }

    /// Disconnect the enabled transports
    pub fn disconnect(&self) {
        if self.shared.options.use_websocket {
            self.shared.websocket.disconnect();
        }
        if self.shared.options.use_sse {
            self.shared.sse.disconnect();
        }
    }

    /// Tear down now
    pub fn close(self) {}

    fn teardown(&mut self) {
        {
            let _evaluate = lock(&self.shared.evaluate);
            if !self.shared.alive.swap(false, Ordering::SeqCst) {
                return;
            }
        }
        self.subscriptions.clear();
        self.shared.polling.stop(&self.shared.polling_key);
        tracing::debug!(key = %self.shared.polling_key, "realtime session closed");
    }
}

impl Drop for RealtimeSession {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for RealtimeSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeSession")
            .field("data_key", &self.shared.data_key)
            .field("polling_key", &self.shared.polling_key)
            .field("status", &self.status())
            .finish()
    }
}
