//! The notification log and its observer registry.
//!
//! One store is built at application start and handed (behind an `Arc`) to
//! whatever needs it. Every mutation goes through the store so observers
//! always receive a snapshot matching the real state.
//!
//! Observers are called outside the store lock. Each one has its own
//! delivery slot: it is never run concurrently with itself, and a snapshot
//! older than one it already received (or has queued) is dropped. When
//! mutations race, an observer may skip intermediate snapshots but its last
//! call always carries the newest state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use log::{debug, trace, warn};

use super::snapshot::Snapshot;
use crate::core::config::Settings;
use crate::core::model::{AlertPayload, Notification, NotificationId, Severity};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
struct DeliveryState {
    /// Newest snapshot waiting to be handed over
    pending: Option<Snapshot>,
    /// Version of the last snapshot handed over
    delivered: Option<u64>,
    /// Some thread is currently inside the observer for this slot
    running: bool,
    closed: bool,
}

/// Per-observer delivery slot.
struct Delivery {
    observer: Box<dyn Fn(&Snapshot) + Send + Sync>,
    state: Mutex<DeliveryState>,
}

impl Delivery {
    fn offer(&self, snapshot: &Snapshot) {
        let mut state = lock(&self.state);
        if state.closed {
            return;
        }
        let newest = state.pending.as_ref().map(Snapshot::version).or(state.delivered);
        if matches!(newest, Some(version) if snapshot.version() <= version) {
            trace!("Dropping stale snapshot v{}", snapshot.version());
            return;
        }
        state.pending = Some(snapshot.clone());
        if state.running {
            // The thread already delivering picks it up when the observer returns
            return;
        }

        state.running = true;
        loop {
            let next = match state.pending.take() {
                Some(next) if !state.closed => next,
                _ => {
                    state.running = false;
                    return;
                }
            };
            state.delivered = Some(next.version());
            drop(state);
            (self.observer)(&next);
            state = lock(&self.state);
        }
    }

    fn close(&self) {
        let mut state = lock(&self.state);
        state.closed = true;
        state.pending = None;
    }
}

struct StoreInner {
    entries: Vec<Notification>,
    next_id: u64,
    /// Bumped on every mutation
    version: u64,
    /// Upper bound on retained entries (None = unbounded)
    capacity: Option<usize>,
    observers: Vec<(u64, Arc<Delivery>)>,
    next_observer_id: u64,
}

impl StoreInner {
    /// Drop entries until the log fits the capacity, preferring the oldest
    /// acknowledged ones. Returns how many were dropped.
    fn enforce_capacity(&mut self) -> usize {
        let Some(capacity) = self.capacity else {
            return 0;
        };
        let mut evicted_count = 0;
        while self.entries.len() > capacity {
            let index = self.entries.iter().position(|n| n.seen).unwrap_or(0);
            let evicted = self.entries.remove(index);
            evicted_count += 1;
            if evicted.seen {
                debug!("Notification log full, evicted seen entry {}", evicted.id);
            } else {
                warn!(
                    "Notification log full, evicted unseen entry {} ({:?})",
                    evicted.id, evicted.title
                );
            }
        }
        evicted_count
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::new(&self.entries, self.version)
    }

    /// Record a mutation and collect what needs to be broadcast.
    fn commit(&mut self) -> Broadcast {
        self.version += 1;
        Broadcast {
            snapshot: self.snapshot(),
            targets: self.observers.iter().map(|(_, d)| Arc::clone(d)).collect(),
        }
    }
}

/// A snapshot and the observers it goes to, sent after the store lock is released.
struct Broadcast {
    snapshot: Snapshot,
    targets: Vec<Arc<Delivery>>,
}

impl Broadcast {
    fn send(self) {
        for delivery in &self.targets {
            delivery.offer(&self.snapshot);
        }
    }
}

/// Ordered, append-only log of notifications.
pub struct NotificationStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl NotificationStore {
    /// Create an unbounded store.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Create a store that keeps at most `capacity` entries (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        Self::build(Some(capacity.max(1)))
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::build(settings.notification_capacity.map(|c| c.max(1)))
    }

    fn build(capacity: Option<usize>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(StoreInner {
                entries: Vec::new(),
                next_id: 1,
                version: 0,
                capacity,
                observers: Vec::new(),
                next_observer_id: 1,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        // Observers run outside the lock, so a poisoned guard still holds a consistent log
        lock(&self.inner)
    }

    /// Log a new unseen notification at the end of the log.
    pub fn append(&self, severity: Severity, base: AlertPayload) -> Notification {
        let (notification, broadcast) = {
            let mut inner = self.lock();
            let id = NotificationId(inner.next_id);
            inner.next_id += 1;

            let notification = Notification::new(id, severity, base);
            inner.entries.push(notification.clone());
            inner.enforce_capacity();
            debug!("Logged {} notification {}: {:?}", severity, id, notification.title);
            (notification, inner.commit())
        };

        broadcast.send();
        notification
    }

    /// Mark one notification as seen.
    ///
    /// Unknown ids are ignored, as is an entry that is already seen. Returns
    /// whether the log changed.
    pub fn mark_seen(&self, id: NotificationId) -> bool {
        let broadcast = {
            let mut inner = self.lock();
            let changed = match inner.entries.iter_mut().find(|n| n.id == id) {
                Some(entry) if !entry.seen => {
                    entry.seen = true;
                    true
                }
                Some(_) => false,
                None => {
                    trace!("mark_seen: no notification {}", id);
                    false
                }
            };
            if changed {
                debug!("Marked notification {} as seen", id);
                Some(inner.commit())
            } else {
                None
            }
        };

        match broadcast {
            Some(broadcast) => {
                broadcast.send();
                true
            }
            None => false,
        }
    }

    /// Mark every notification as seen and notify observers once.
    pub fn mark_all_seen(&self) {
        let broadcast = {
            let mut inner = self.lock();
            let updated: Vec<Notification> = inner
                .entries
                .iter()
                .map(|n| Notification {
                    seen: true,
                    ..n.clone()
                })
                .collect();
            inner.entries = updated;
            debug!("Marked all {} notifications as seen", inner.entries.len());
            inner.commit()
        };

        broadcast.send();
    }

    /// Change the retention bound at runtime. Shrinking below the current
    /// length evicts immediately; observers are notified only if something
    /// was evicted.
    pub fn set_capacity(&self, capacity: Option<usize>) {
        let broadcast = {
            let mut inner = self.lock();
            inner.capacity = capacity.map(|c| c.max(1));
            debug!("Notification capacity set to {:?}", inner.capacity);
            (inner.enforce_capacity() > 0).then(|| inner.commit())
        };

        if let Some(broadcast) = broadcast {
            broadcast.send();
        }
    }

    pub fn capacity(&self) -> Option<usize> {
        self.lock().capacity
    }

    /// Current state of the log.
    pub fn snapshot(&self) -> Snapshot {
        self.lock().snapshot()
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register an observer. It is called right away with the current log and
    /// again after every mutation until the returned subscription is cancelled.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&Snapshot) + Send + Sync + 'static,
    {
        let delivery = Arc::new(Delivery {
            observer: Box::new(observer),
            state: Mutex::new(DeliveryState::default()),
        });
        let (id, snapshot) = {
            let mut inner = self.lock();
            let id = inner.next_observer_id;
            inner.next_observer_id += 1;
            inner.observers.push((id, Arc::clone(&delivery)));
            (id, inner.snapshot())
        };
        trace!("Observer {} subscribed", id);

        delivery.offer(&snapshot);

        Subscription {
            id,
            store: Arc::downgrade(&self.inner),
            active: AtomicBool::new(true),
        }
    }

    pub fn observer_count(&self) -> usize {
        self.lock().observers.len()
    }
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle returned by [`NotificationStore::subscribe`].
///
/// Dropping it does not unsubscribe; call [`Subscription::unsubscribe`].
pub struct Subscription {
    id: u64,
    store: Weak<Mutex<StoreInner>>,
    active: AtomicBool,
}

impl Subscription {
    /// Stop delivering snapshots to this observer. Safe to call repeatedly.
    pub fn unsubscribe(&self) {
        if !self.active.swap(false, Ordering::SeqCst) {
            return;
        }
        let Some(store) = self.store.upgrade() else {
            return;
        };
        let removed = {
            let mut inner = lock(&store);
            let position = inner.observers.iter().position(|(id, _)| *id == self.id);
            position.map(|index| inner.observers.remove(index).1)
        };
        if let Some(delivery) = removed {
            delivery.close();
            trace!("Observer {} unsubscribed", self.id);
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}
