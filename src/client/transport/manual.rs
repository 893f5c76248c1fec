//! Manual Transport
//!
//! A transport with no network behind it: the caller sets its status and
//! pushes frames. Used for demo mode (no server) and as a test double.

use std::sync::Arc;

use crate::client::listeners::{Listeners, Subscription};
use crate::client::transport::{
    ConnectionStatus, FrameCallback, StatusCallback, StatusCell, Transport,
};

struct ManualInner<F> {
    status: StatusCell,
    frames: Listeners<F>,
    generation: std::sync::atomic::AtomicU64,
    auto_connect: bool,
}

/// Caller-driven transport
pub struct ManualTransport<F> {
    inner: Arc<ManualInner<F>>,
}

impl<F> Clone for ManualTransport<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F: Send + Sync + 'static> ManualTransport<F> {
    /// `connect()` leaves the transport in `Connecting` until `set_status`
    pub fn new() -> Self {
        Self::build(false)
    }

    /// `connect()` goes straight to `Connected`
    pub fn auto_connecting() -> Self {
        Self::build(true)
    }

    fn build(auto_connect: bool) -> Self {
        Self {
            inner: Arc::new(ManualInner {
                status: StatusCell::new(),
                frames: Listeners::new(),
                generation: std::sync::atomic::AtomicU64::new(0),
                auto_connect,
            }),
        }
    }

    /// Force a status transition. Leaving `Disconnected` or `Error` passes
    /// through `Connecting` first, as a real connection would.
    pub fn set_status(&self, status: ConnectionStatus) {
        if self.inner.status.get() == status {
            return;
        }
        let generation = match self.inner.status.begin() {
            Some(generation) => generation,
            None => self.current_generation(),
        };
        self.remember(generation);
        self.inner.status.set_for(generation, status);
    }

    /// Deliver an inbound frame to listeners
    pub fn push(&self, frame: F) {
        self.inner.frames.emit(&frame);
    }

    /// Number of registered frame listeners
    pub fn frame_listener_count(&self) -> usize {
        self.inner.frames.len()
    }

    fn current_generation(&self) -> u64 {
        self.inner.generation.load(std::sync::atomic::Ordering::SeqCst)
    }

    fn remember(&self, generation: u64) {
        self.inner
            .generation
            .store(generation, std::sync::atomic::Ordering::SeqCst);
    }
}

impl<F: Send + Sync + 'static> Default for ManualTransport<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Send + Sync + 'static> Transport for ManualTransport<F> {
    type Frame = F;

    fn connect(&self) {
        if let Some(generation) = self.inner.status.begin() {
            self.remember(generation);
            if self.inner.auto_connect {
                self.inner.status.set_for(generation, ConnectionStatus::Connected);
            }
        }
    }

    fn disconnect(&self) {
        self.inner.status.end();
    }

    fn status(&self) -> ConnectionStatus {
        self.inner.status.get()
    }

    fn on_status_change(&self, callback: StatusCallback) -> Subscription {
        self.inner.status.subscribe(callback)
    }

    fn on_frame(&self, callback: FrameCallback<F>) -> Subscription {
        self.inner.frames.add(callback)
    }
}
