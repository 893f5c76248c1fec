//! # Listener Registry
//!
//! Ordered callback registry used for status and frame notifications.
//! Every `emit` reaches every registered listener, in registration order,
//! with no coalescing.
//!
//! Callbacks run on the emitting task after the registry lock is released,
//! so a callback may add or remove listeners on the same registry.

use std::sync::{Arc, Mutex, Weak};

use crate::client::lock;

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Registry<T> {
    next_id: u64,
    callbacks: Vec<(u64, Callback<T>)>,
}

/// Callback registry for values of type `T`
pub struct Listeners<T> {
    registry: Arc<Mutex<Registry<T>>>,
}

impl<T: 'static> Listeners<T> {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                callbacks: Vec::new(),
            })),
        }
    }

    /// Register a callback; it stays registered until the handle is dropped
    pub fn add<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = {
            let mut registry = lock(&self.registry);
            let id = registry.next_id;
            registry.next_id += 1;
            registry.callbacks.push((id, Arc::new(callback)));
            id
        };

        let weak: Weak<Mutex<Registry<T>>> = Arc::downgrade(&self.registry);
        Subscription::new(move || {
            if let Some(registry) = weak.upgrade() {
                lock(&registry).callbacks.retain(|(cb_id, _)| *cb_id != id);
            }
        })
    }

    /// Deliver `value` to every registered callback
    pub fn emit(&self, value: &T) {
        let snapshot: Vec<Callback<T>> = lock(&self.registry)
            .callbacks
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();

        for callback in snapshot {
            callback(value);
        }
    }

    /// Number of registered callbacks
    pub fn len(&self) -> usize {
        lock(&self.registry).callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: 'static> Default for Listeners<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Listeners<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &lock(&self.registry).callbacks.len())
            .finish()
    }
}

/// Handle returned by every `on_*` registration.
///
/// Dropping the handle unsubscribes. Call [`Subscription::detach`] to keep
/// the listener for the lifetime of the source.
#[must_use = "dropping a Subscription immediately removes the listener"]
pub struct Subscription {
    remove: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    fn new<F>(remove: F) -> Self
    where
        F: FnOnce() + Send + Sync + 'static,
    {
        Self {
            remove: Some(Box::new(remove)),
        }
    }

    /// Remove the listener now
    pub fn unsubscribe(mut self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }

    /// Keep the listener registered after the handle is gone
    pub fn detach(mut self) {
        self.remove = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.remove.is_some())
            .finish()
    }
}
