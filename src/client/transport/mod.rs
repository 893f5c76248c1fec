//! # Live Transports
//!
//! Persistent connections that push change notifications to the client.
//!
//! Every transport owns exactly one connection and reports its lifecycle as
//! [`ConnectionStatus`] transitions. Connection failures are never returned
//! as errors: they show up as `Error` followed by `Disconnected`, and
//! callers must treat "not connected" as a normal steady state.
//!
//! - **`websocket`** - `{type, payload}` JSON frames over WebSocket
//! - **`sse`** - `text/event-stream` over HTTP
//! - **`manual`** - caller-driven transport for demo mode and tests

pub mod manual;
pub mod sse;
pub mod websocket;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::client::lock;
use crate::client::listeners::{Listeners, Subscription};

pub use manual::ManualTransport;
pub use sse::SseClient;
pub use websocket::WebSocketClient;

/// Connection status of a live transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
    Error,
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Error => "error",
        };
        f.write_str(label)
    }
}

/// Transport errors. Only raised by outbound operations, never by the
/// connection lifecycle.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport is not connected")]
    NotConnected,
    #[error("failed to encode frame: {0}")]
    Encode(#[from] crate::shared::SharedError),
}

/// Callback types accepted by [`Transport`]
pub type StatusCallback = Box<dyn Fn(&ConnectionStatus) + Send + Sync>;
pub type FrameCallback<F> = Box<dyn Fn(&F) + Send + Sync>;

/// The status/frame provider the realtime coordinator consumes.
pub trait Transport: Send + Sync + 'static {
    /// Inbound frame type
    type Frame: Send + Sync + 'static;

    /// Open the connection. No-op while connecting or connected.
    fn connect(&self);

    /// Close the connection and stop reconnecting. Safe to repeat.
    fn disconnect(&self);

    fn status(&self) -> ConnectionStatus;

    fn is_connected(&self) -> bool {
        self.status() == ConnectionStatus::Connected
    }

    fn on_status_change(&self, callback: StatusCallback) -> Subscription;

    fn on_frame(&self, callback: FrameCallback<Self::Frame>) -> Subscription;
}

/// Internal reconnection policy: exponential backoff, reset after every
/// successful connection.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    /// Delay before the first reconnect attempt
    pub initial_delay: Duration,
    /// Upper bound for the delay
    pub max_delay: Duration,
    /// Consecutive failed attempts before giving up (0 disables reconnects)
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(1000),
            max_delay: Duration::from_secs(30),
            max_attempts: 5,
        }
    }
}

impl ReconnectPolicy {
    /// Never reconnect
    pub fn disabled() -> Self {
        Self {
            max_attempts: 0,
            ..Self::default()
        }
    }

    /// Delay before reconnect attempt `attempt` (0-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.min(16));
        self.initial_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }
}

/// Status holder shared by a transport and its connection task.
///
/// Each `connect` opens a new generation; writes from a task whose
/// generation was superseded (by `disconnect` or a later `connect`) are
/// dropped, so an aborted task can never resurrect a closed connection.
/// Transitions are serialized, which keeps listener delivery in order.
/// Listeners must not drive the same transport from inside the callback.
#[derive(Debug)]
pub(crate) struct StatusCell {
    status: Mutex<ConnectionStatus>,
    generation: AtomicU64,
    transition: Mutex<()>,
    listeners: Listeners<ConnectionStatus>,
}

impl StatusCell {
    pub(crate) fn new() -> Self {
        Self {
            status: Mutex::new(ConnectionStatus::Disconnected),
            generation: AtomicU64::new(0),
            transition: Mutex::new(()),
            listeners: Listeners::new(),
        }
    }

    pub(crate) fn get(&self) -> ConnectionStatus {
        *lock(&self.status)
    }

    pub(crate) fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&ConnectionStatus) + Send + Sync + 'static,
    {
        self.listeners.add(callback)
    }

    /// Start a new generation in `Connecting`, unless already connecting or
    /// connected.
    pub(crate) fn begin(&self) -> Option<u64> {
        let _transition = lock(&self.transition);
        if matches!(
            self.get(),
            ConnectionStatus::Connecting | ConnectionStatus::Connected
        ) {
            return None;
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.apply(ConnectionStatus::Connecting);
        Some(generation)
    }

    /// Transition on behalf of `generation`; false if it was superseded.
    pub(crate) fn set_for(&self, generation: u64, status: ConnectionStatus) -> bool {
        let _transition = lock(&self.transition);
        if self.generation.load(Ordering::SeqCst) != generation {
            return false;
        }
        self.apply(status);
        true
    }

    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Supersede the running generation and settle in `Disconnected`.
    pub(crate) fn end(&self) {
        let _transition = lock(&self.transition);
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.apply(ConnectionStatus::Disconnected);
    }

    fn apply(&self, status: ConnectionStatus) {
        let changed = {
            let mut current = lock(&self.status);
            let changed = *current != status;
            *current = status;
            changed
        };
        if changed {
            self.listeners.emit(&status);
        }
    }
}
