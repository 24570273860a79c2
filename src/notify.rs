//! Zero-payload "data changed" broadcast.
//!
//! The store publishes after every successful mutation; views subscribe to
//! learn that what they display is stale. Delivery is synchronous, in
//! subscription order, with no buffering and no replay.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tracing::trace;

type Handler = Arc<dyn Fn() + Send + Sync>;

#[derive(Clone)]
struct Entry {
    id: u64,
    // cleared on unsubscribe; checked again at delivery time
    active: Arc<AtomicBool>,
    handler: Handler,
}

#[derive(Default)]
struct Observers {
    next_id: u64,
    entries: Vec<Entry>,
}

/// Cloneable handle to a shared observer list.
#[derive(Clone, Default)]
pub struct UpdateNotifier {
    observers: Arc<Mutex<Observers>>,
}

impl std::fmt::Debug for UpdateNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateNotifier")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

fn lock(observers: &Mutex<Observers>) -> MutexGuard<'_, Observers> {
    // Handlers never run under the lock, so a poisoned list is still intact.
    observers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl UpdateNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for every future `publish`.
    ///
    /// Delivery stops when the returned handle is unsubscribed or dropped.
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let active = Arc::new(AtomicBool::new(true));
        let mut observers = lock(&self.observers);
        let id = observers.next_id;
        observers.next_id += 1;
        observers.entries.push(Entry {
            id,
            active: Arc::clone(&active),
            handler: Arc::new(handler),
        });
        trace!(subscription = id, "observer subscribed");

        Subscription {
            id,
            active,
            observers: Arc::downgrade(&self.observers),
        }
    }

    /// Call every current subscriber once, in subscription order.
    ///
    /// A handler unsubscribed by an earlier handler of the same publish is
    /// skipped; one subscribed during the publish waits for the next.
    pub fn publish(&self) {
        let entries: Vec<Entry> = lock(&self.observers).entries.clone();

        trace!(subscribers = entries.len(), "publishing expense update");
        for entry in entries {
            if entry.active.load(Ordering::SeqCst) {
                (entry.handler)();
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.observers).entries.len()
    }
}

/// Handle returned by [`UpdateNotifier::subscribe`].
#[must_use = "dropping a Subscription unsubscribes its handler"]
pub struct Subscription {
    id: u64,
    active: Arc<AtomicBool>,
    observers: Weak<Mutex<Observers>>,
}

impl Subscription {
    /// Stop delivery to this handler. Safe to call more than once.
    pub fn unsubscribe(&self) {
        if !self.active.swap(false, Ordering::SeqCst) {
            return;
        }
        let Some(observers) = self.observers.upgrade() else {
            return;
        };
        // Removed handlers are dropped after the lock is released: a handler
        // may own another Subscription to this same notifier.
        let removed: Vec<Entry> = {
            let mut observers = lock(&observers);
            let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut observers.entries)
                .into_iter()
                .partition(|entry| entry.id == self.id);
            observers.entries = kept;
            removed
        };
        if !removed.is_empty() {
            trace!(subscription = self.id, "observer unsubscribed");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
