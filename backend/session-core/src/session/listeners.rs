//! Subscriber fan-out.

use models::SessionSnapshot;

use log::debug;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

pub(crate) type Listener = Arc<dyn Fn(&SessionSnapshot) + Send + Sync>;

/// Registered listeners, keyed by subscription id.
#[derive(Default)]
pub(crate) struct ListenerRegistry {
    next_id: AtomicU64,
    last_delivered: AtomicU64,
    listeners: Mutex<Vec<(u64, Listener)>>,
}

impl ListenerRegistry {
    /// Register `listener`. `replay` is read under the registry lock so no
    /// commit can be fanned out between the read and the registration.
    pub(crate) fn register(
        &self,
        listener: Listener,
        replay: impl FnOnce() -> SessionSnapshot,
    ) -> (u64, SessionSnapshot) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut listeners = self.lock();
        let snapshot = replay();
        listeners.push((id, listener));
        (id, snapshot)
    }

    pub(crate) fn remove(&self, id: u64) -> bool {
        let mut listeners = self.lock();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    /// Invoke every listener with `snapshot`, outside the registry lock.
    ///
    /// `seq` is the commit's position in store order. A fan-out whose `seq`
    /// is not newer than the last one delivered is dropped, so listeners
    /// never end on an older snapshot than the store holds. Returns whether
    /// the fan-out was delivered.
    pub(crate) fn notify(&self, seq: u64, snapshot: &SessionSnapshot) -> bool {
        let current: Vec<Listener> = {
            let listeners = self.lock();
            if self.last_delivered.fetch_max(seq, Ordering::SeqCst) >= seq {
                debug!("Dropping stale fan-out #{seq}");
                return false;
            }
            listeners
                .iter()
                .map(|(_, listener)| Arc::clone(listener))
                .collect()
        };

        for listener in current {
            listener(snapshot);
        }
        true
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<(u64, Listener)>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle to a registered listener.
///
/// Dropping it (or calling [`Subscription::unsubscribe`]) stops delivery to
/// that listener; other subscribers are unaffected.
#[must_use = "dropping a Subscription unsubscribes its listener"]
pub struct Subscription {
    id: u64,
    registry: Weak<ListenerRegistry>,
}

impl Subscription {
    pub(crate) fn new(id: u64, registry: &Arc<ListenerRegistry>) -> Self {
        Self {
            id,
            registry: Arc::downgrade(registry),
        }
    }

    pub fn unsubscribe(self) {
        // Drop does the work.
    }
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
