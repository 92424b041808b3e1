use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::debug;

use crate::models::cart_item::CartState;

pub type Listener = Arc<dyn Fn(&CartState) + Send + Sync>;

/// Registered store listeners, called in registration order.
#[derive(Default)]
pub(crate) struct ListenerRegistry {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(u64, Listener)>>,
    delivery: Mutex<Delivery>,
}

/// Whether a notification pass is running, and whether the state changed
/// again while it was.
#[derive(Default)]
struct Delivery {
    running: bool,
    pending: bool,
}

/// Clears the running flag when a listener panics mid-pass.
struct DeliveryGuard<'a>(&'a Mutex<Delivery>);

impl Drop for DeliveryGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            let mut delivery = self.0.lock().unwrap_or_else(PoisonError::into_inner);
            delivery.running = false;
            delivery.pending = false;
        }
    }
}

impl ListenerRegistry {
    fn lock(&self) -> MutexGuard<'_, Vec<(u64, Listener)>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn register(self: &Arc<Self>, listener: Listener) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.lock().push((id, listener));
        debug!("Store listener {} registered", id);

        Subscription {
            id,
            registry: Arc::downgrade(self),
        }
    }

    fn remove(&self, id: u64) {
        self.lock().retain(|(listener_id, _)| *listener_id != id);
        debug!("Store listener {} removed", id);
    }

    /// Calls every listener with the state returned by `current`.
    ///
    /// Only one pass runs at a time. A change made while a pass is running,
    /// by a listener or by another thread, marks the pass pending instead of
    /// starting a nested one; the running pass then starts over with a fresh
    /// state. Every listener therefore ends on the latest state. The registry
    /// lock is released first so listeners may subscribe, unsubscribe or
    /// mutate the store.
    pub(crate) fn notify<F>(&self, current: F)
    where
        F: Fn() -> CartState,
    {
        {
            let mut delivery = self.delivery();
            if delivery.running {
                delivery.pending = true;
                debug!("Store changed during notification, pass queued");
                return;
            }
            delivery.running = true;
        }
        let _guard = DeliveryGuard(&self.delivery);

        loop {
            let state = current();
            let listeners: Vec<Listener> = self
                .lock()
                .iter()
                .map(|(_, listener)| Arc::clone(listener))
                .collect();

            for listener in listeners {
                listener(&state);
            }

            let mut delivery = self.delivery();
            if !std::mem::take(&mut delivery.pending) {
                delivery.running = false;
                break;
            }
        }
    }

    fn delivery(&self) -> MutexGuard<'_, Delivery> {
        self.delivery.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }
}

/// Handle returned by `CartStore::subscribe`.
///
/// The listener stays registered until the handle is dropped or
/// `unsubscribe` is called.
#[must_use = "dropping a Subscription unsubscribes its listener"]
pub struct Subscription {
    id: u64,
    registry: Weak<ListenerRegistry>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
