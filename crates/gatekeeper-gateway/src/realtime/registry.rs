use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use tokio::sync::{mpsc, watch};

use gatekeeper_core::protocol::AuditEvent;

/// Registered subscriber: its queue plus its close signal.
struct Slot {
    id: u64,
    tx: mpsc::Sender<AuditEvent>,
    close: watch::Sender<bool>,
}

/// What the dispatcher needs to forward one event.
#[derive(Clone)]
pub(crate) struct Target {
    pub id: u64,
    pub tx: mpsc::Sender<AuditEvent>,
}

/// Receiving half handed to a new subscriber.
pub(crate) struct Registration {
    pub id: u64,
    pub rx: mpsc::Receiver<AuditEvent>,
    pub close: watch::Receiver<bool>,
}

#[derive(Default)]
struct Slots {
    list: Vec<Slot>,
    closed: bool,
}

/// Per-bus subscriber list in registration order.
///
/// One lock guards the list. It is held for mutation and for taking a
/// snapshot, never across a send.
#[derive(Default)]
pub struct SubscriptionRegistry {
    slots: RwLock<Slots>,
    seq: AtomicU64,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self {
            slots: RwLock::new(Slots::default()),
            seq: AtomicU64::new(1),
        }
    }

    /// Register a subscriber with a bounded queue. After `close_all` the
    /// returned registration is already closed and is not tracked.
    pub(crate) fn register(&self, capacity: usize) -> Registration {
        let id = self.seq.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let (close_tx, close_rx) = watch::channel(false);

        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        if slots.closed {
            let _ = close_tx.send(true);
        } else {
            slots.list.push(Slot { id, tx, close: close_tx });
        }

        Registration { id, rx, close: close_rx }
    }

    /// Unregister and close. Returns false if `id` was already gone.
    pub fn remove(&self, id: u64) -> bool {
        let removed = {
            let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
            slots
                .list
                .iter()
                .position(|s| s.id == id)
                .map(|pos| slots.list.remove(pos))
        };
        match removed {
            Some(slot) => {
                let _ = slot.close.send(true);
                true
            }
            None => false,
        }
    }

    /// Unregister without raising the close flag. Dropping the slot releases
    /// the queue sender, so the subscriber still drains what it was handed and
    /// then sees the end of its stream.
    pub(crate) fn evict(&self, id: u64) -> bool {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        match slots.list.iter().position(|s| s.id == id) {
            Some(pos) => {
                slots.list.remove(pos);
                true
            }
            None => false,
        }
    }

    pub(crate) fn snapshot(&self) -> Vec<Target> {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        slots
            .list
            .iter()
            .map(|s| Target { id: s.id, tx: s.tx.clone() })
            .collect()
    }

    /// Close every subscriber and refuse new ones. Returns how many were closed.
    pub fn close_all(&self) -> usize {
        let drained = {
            let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
            slots.closed = true;
            std::mem::take(&mut slots.list)
        };
        for slot in &drained {
            let _ = slot.close.send(true);
        }
        drained.len()
    }

    pub fn len(&self) -> usize {
        self.slots.read().unwrap_or_else(PoisonError::into_inner).list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_closed(&self) -> bool {
        self.slots.read().unwrap_or_else(PoisonError::into_inner).closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_keeps_registration_order() {
        let reg = SubscriptionRegistry::new();
        let a = reg.register(4);
        let b = reg.register(4);
        let c = reg.register(4);

        let ids: Vec<u64> = reg.snapshot().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![a.id, b.id, c.id]);
    }

    #[test]
    fn remove_is_idempotent_and_signals_close() {
        let reg = SubscriptionRegistry::new();
        let a = reg.register(4);

        assert!(reg.remove(a.id));
        assert!(!reg.remove(a.id));
        assert!(*a.close.borrow());
        assert!(reg.is_empty());
    }

    #[test]
    fn evict_unregisters_without_close_flag() {
        let reg = SubscriptionRegistry::new();
        let mut a = reg.register(4);

        assert!(reg.evict(a.id));
        assert!(!reg.evict(a.id));
        assert!(!reg.remove(a.id));
        assert!(!*a.close.borrow());
        assert!(a.close.has_changed().is_err());
        assert!(reg.is_empty());
        assert!(a.rx.try_recv().is_err());
    }

    #[test]
    fn register_after_close_all_is_closed() {
        let reg = SubscriptionRegistry::new();
        let a = reg.register(4);
        assert_eq!(reg.close_all(), 1);
        assert!(*a.close.borrow());

        let late = reg.register(4);
        assert!(*late.close.borrow());
        assert!(reg.is_empty());
        assert!(reg.is_closed());
    }
}
