use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::timeout;

use gatekeeper_core::error::{GatekeeperError, Result};
use gatekeeper_core::protocol::AuditEvent;

use super::registry::{Registration, SubscriptionRegistry};
use super::types::{BusConfig, Feed};

/// Depth of the publish inbox in front of the dispatcher.
const INBOX_CAPACITY: usize = 256;

struct Envelope {
    event: AuditEvent,
    done: oneshot::Sender<()>,
}

#[derive(Default)]
struct BusCounters {
    published: AtomicU64,
    evicted: AtomicU64,
}

/// Ordered fan-out from many publishers to a dynamic set of subscribers.
///
/// A single dispatcher task serializes every published event, so each
/// subscriber observes one global order. `publish` resolves once the event has
/// been handed to every subscriber that was registered when it was dispatched.
pub struct EventBus {
    feed: Feed,
    cfg: BusConfig,
    registry: Arc<SubscriptionRegistry>,
    inbox: mpsc::Sender<Envelope>,
    shutdown: watch::Sender<bool>,
    counters: Arc<BusCounters>,
}

impl EventBus {
    /// Create the bus and spawn its dispatcher on the current runtime.
    pub fn spawn(feed: Feed, cfg: BusConfig) -> Arc<Self> {
        let registry = Arc::new(SubscriptionRegistry::new());
        let (inbox_tx, inbox_rx) = mpsc::channel(INBOX_CAPACITY);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let counters = Arc::new(BusCounters::default());

        tokio::spawn(run_dispatcher(
            feed,
            cfg,
            Arc::clone(&registry),
            inbox_rx,
            shutdown_rx,
            Arc::clone(&counters),
        ));

        Arc::new(Self {
            feed,
            cfg,
            registry,
            inbox: inbox_tx,
            shutdown: shutdown_tx,
            counters,
        })
    }

    pub fn feed(&self) -> Feed {
        self.feed
    }

    pub async fn publish(&self, event: AuditEvent) -> Result<()> {
        let (done_tx, done_rx) = oneshot::channel();
        self.inbox
            .send(Envelope { event, done: done_tx })
            .await
            .map_err(|_| GatekeeperError::Internal(format!("{} bus closed", self.feed)))?;
        done_rx.await.map_err(|_| {
            GatekeeperError::Internal(format!("{} bus stopped before delivery", self.feed))
        })
    }

    pub fn subscribe(&self) -> Subscription {
        let Registration { id, rx, close } = self.registry.register(self.cfg.queue_capacity);
        tracing::debug!(feed = %self.feed, sub_id = id, "subscribed");
        Subscription {
            id,
            feed: self.feed,
            rx,
            close,
            registry: Arc::clone(&self.registry),
        }
    }

    /// Stop delivery to `sub`. Safe to call more than once.
    pub fn unsubscribe(&self, sub: &mut Subscription) {
        sub.unsubscribe();
    }

    /// Close every subscriber and stop the dispatcher. Queued events that have
    /// not been dispatched yet are discarded and their publishers get an error.
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(true);
        let closed = self.registry.close_all();
        tracing::info!(feed = %self.feed, closed, "event bus shutdown");
    }

    /// True once `shutdown` ran or the dispatcher stopped.
    pub fn is_closed(&self) -> bool {
        self.registry.is_closed()
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.len()
    }

    pub fn published_count(&self) -> u64 {
        self.counters.published.load(Ordering::Relaxed)
    }

    pub fn evicted_count(&self) -> u64 {
        self.counters.evicted.load(Ordering::Relaxed)
    }
}

impl Drop for EventBus {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}

async fn run_dispatcher(
    feed: Feed,
    cfg: BusConfig,
    registry: Arc<SubscriptionRegistry>,
    mut inbox: mpsc::Receiver<Envelope>,
    mut shutdown: watch::Receiver<bool>,
    counters: Arc<BusCounters>,
) {
    loop {
        tokio::select! {
            biased;

            _ = shutdown.changed() => break,

            msg = inbox.recv() => {
                let Some(Envelope { event, done }) = msg else { break; };
                broadcast(feed, cfg, &registry, event, &counters).await;
                counters.published.fetch_add(1, Ordering::Relaxed);
                let _ = done.send(());
            }
        }
    }

    registry.close_all();
    tracing::debug!(feed = %feed, "event bus dispatcher stopped");
}

/// Forward one event to each subscriber in registration order.
async fn broadcast(
    feed: Feed,
    cfg: BusConfig,
    registry: &SubscriptionRegistry,
    event: AuditEvent,
    counters: &BusCounters,
) {
    for target in registry.snapshot() {
        match timeout(cfg.send_timeout, target.tx.send(event.clone())).await {
            Ok(Ok(())) => {}
            Ok(Err(_)) => {
                // receiver dropped without unsubscribing first
                registry.remove(target.id);
            }
            Err(_) => {
                if registry.evict(target.id) {
                    counters.evicted.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(
                        feed = %feed,
                        sub_id = target.id,
                        timeout_ms = cfg.send_timeout.as_millis() as u64,
                        "subscriber queue full, evicted"
                    );
                }
            }
        }
    }
}

/// Handle returned by [`EventBus::subscribe`].
///
/// Yields events until it is unsubscribed, evicted, or the bus shuts down.
/// Dropping the handle unsubscribes it.
pub struct Subscription {
    id: u64,
    feed: Feed,
    rx: mpsc::Receiver<AuditEvent>,
    close: watch::Receiver<bool>,
    registry: Arc<SubscriptionRegistry>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn feed(&self) -> Feed {
        self.feed
    }

    /// True once the subscription will be handed no further events, whether
    /// it was closed or evicted. An evicted subscription may still hold queued
    /// events.
    pub fn is_closed(&self) -> bool {
        self.closed_now() || self.close.has_changed().is_err()
    }

    /// Closed by unsubscribe or shutdown, as opposed to evicted.
    fn closed_now(&self) -> bool {
        *self.close.borrow()
    }

    /// Next event, or `None` at the end of the stream.
    ///
    /// After unsubscribe or shutdown nothing more is yielded, even if events
    /// are still queued. After eviction the events already delivered to the
    /// queue are yielded first.
    pub async fn recv(&mut self) -> Option<AuditEvent> {
        loop {
            if self.closed_now() {
                return None;
            }
            tokio::select! {
                biased;

                changed = self.close.changed() => {
                    if changed.is_err() {
                        // evicted: the queue sender is gone too
                        return self.rx.recv().await;
                    }
                }
                ev = self.rx.recv() => return ev,
            }
        }
    }

    /// Non-blocking variant of [`Subscription::recv`].
    pub fn try_recv(&mut self) -> Option<AuditEvent> {
        if self.closed_now() {
            return None;
        }
        self.rx.try_recv().ok()
    }

    pub fn unsubscribe(&mut self) {
        if self.registry.remove(self.id) {
            tracing::debug!(feed = %self.feed, sub_id = self.id, "unsubscribed");
        }
        // fail any send the dispatcher has in flight for us
        self.rx.close();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.registry.remove(self.id);
    }
}
