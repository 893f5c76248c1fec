//! # Polling Service
//!
//! Runs caller-supplied fetch functions on fixed intervals, one task per
//! string key. Polling is the fallback channel used while no live transport
//! is connected.
//!
//! ## Guarantees
//!
//! - At most one task per key: `start` on an existing key cancels the old
//!   task before installing the new one
//! - `stop` is idempotent and ignores unknown keys
//! - A failing or panicking fetch is logged and the schedule continues
//! - Status listeners hear `true`/`false` only when the number of active
//!   tasks crosses zero; fetch failures never change it
//!
//! The first fetch runs one interval after `start`. A fetch that outlasts
//! the interval delays the next tick instead of overlapping it.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rdm_sync::client::polling::{poll_fn, PollingService};
//! use std::time::Duration;
//!
//! # async fn example() {
//! let polling = PollingService::new();
//! polling.start("wallet", poll_fn(|| async { Ok(()) }), Duration::from_secs(5));
//! polling.stop("wallet");
//! # }
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::client::listeners::{Listeners, Subscription};
use crate::client::lock;
use crate::client::request::RequestError;

/// Shortest interval accepted; smaller values are raised to it
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Fetch function run on every tick
pub type PollFn = Arc<dyn Fn() -> BoxFuture<'static, Result<(), RequestError>> + Send + Sync>;

/// Wrap an async closure as a [`PollFn`]
pub fn poll_fn<F, Fut>(f: F) -> PollFn
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), RequestError>> + Send + 'static,
{
    Arc::new(move || Box::pin(f()) as BoxFuture<'static, Result<(), RequestError>>)
}

struct PollTask {
    interval: Duration,
    handle: JoinHandle<()>,
}

/// Keyed polling service
pub struct PollingService {
    tasks: Mutex<HashMap<String, PollTask>>,
    transition: Mutex<()>,
    listeners: Listeners<bool>,
}

impl PollingService {
    pub fn new() -> Self {
        Self {
            tasks: Mutex::new(HashMap::new()),
            transition: Mutex::new(()),
            listeners: Listeners::new(),
        }
    }

    /// Register or replace the polling task for `key`. Must be called from
    /// within a tokio runtime.
    pub fn start(&self, key: impl Into<String>, fetch: PollFn, interval: Duration) {
        let key = key.into();
        let interval = interval.max(MIN_POLL_INTERVAL);
        let handle = spawn_poll_loop(key.clone(), fetch, interval);

        let _transition = lock(&self.transition);
        let (was_active, now_active) = {
            let mut tasks = lock(&self.tasks);
            let was_active = !tasks.is_empty();
            if let Some(previous) = tasks.remove(&key) {
                previous.handle.abort();
                tracing::debug!(%key, "replaced polling task");
            }
            tasks.insert(key.clone(), PollTask { interval, handle });
            (was_active, !tasks.is_empty())
        };
        tracing::info!(%key, interval_ms = interval.as_millis() as u64, "polling started");
        self.notify(was_active, now_active);
    }

    /// Cancel the polling task for `key`, if any
    pub fn stop(&self, key: &str) {
        let _transition = lock(&self.transition);
        let (was_active, now_active) = {
            let mut tasks = lock(&self.tasks);
            let was_active = !tasks.is_empty();
            match tasks.remove(key) {
                Some(task) => task.handle.abort(),
                None => return,
            }
            (was_active, !tasks.is_empty())
        };
        tracing::info!(%key, "polling stopped");
        self.notify(was_active, now_active);
    }

    /// Cancel every task
    pub fn stop_all(&self) {
        let _transition = lock(&self.transition);
        let was_active = {
            let mut tasks = lock(&self.tasks);
            let was_active = !tasks.is_empty();
            for (_, task) in tasks.drain() {
                task.handle.abort();
            }
            was_active
        };
        self.notify(was_active, false);
    }

    /// Whether any polling task is running
    pub fn is_active(&self) -> bool {
        !lock(&self.tasks).is_empty()
    }

    pub fn is_polling(&self, key: &str) -> bool {
        lock(&self.tasks).contains_key(key)
    }

    /// Interval of the task for `key`
    pub fn interval_of(&self, key: &str) -> Option<Duration> {
        lock(&self.tasks).get(key).map(|task| task.interval)
    }

    pub fn active_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = lock(&self.tasks).keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Listen for the "any polling active" signal. Listeners must not call
    /// back into this service.
    pub fn on_status_change<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&bool) + Send + Sync + 'static,
    {
        self.listeners.add(callback)
    }

    fn notify(&self, was_active: bool, now_active: bool) {
        if was_active != now_active {
            self.listeners.emit(&now_active);
        }
    }
}

impl Default for PollingService {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PollingService {
    fn drop(&mut self) {
        for (_, task) in lock(&self.tasks).drain() {
            task.handle.abort();
        }
    }
}

impl std::fmt::Debug for PollingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollingService")
            .field("keys", &self.active_keys())
            .finish()
    }
}

fn spawn_poll_loop(key: String, fetch: PollFn, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            tracing::debug!(%key, "poll tick");
            match AssertUnwindSafe(async { fetch().await }).catch_unwind().await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::warn!(%key, error = %e, "poll fetch failed, keeping schedule");
                }
                Err(panic) => {
                    tracing::error!(
                        %key,
                        panic = panic_message(&*panic),
                        "poll fetch panicked, keeping schedule"
                    );
                }
            }
        }
    })
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
