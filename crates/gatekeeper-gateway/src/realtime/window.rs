//! Tumbling-window statistics for one `Statistics` stream.
//!
//! Each stream owns one aggregator task. The task counts stat-feed events per
//! consumer and per method, and on every tick emits a snapshot of the counts
//! and starts an empty window.

use std::collections::BTreeMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use gatekeeper_core::error::{GatekeeperError, Result};
use gatekeeper_core::protocol::event::unix_now;
use gatekeeper_core::protocol::{AuditEvent, StatSnapshot};

use super::bus::Subscription;

/// Snapshots buffered between the aggregator and the stream writer.
const SNAPSHOT_QUEUE: usize = 4;

pub struct WindowAggregator {
    interval: Duration,
    by_consumer: BTreeMap<String, u64>,
    by_method: BTreeMap<String, u64>,
    last_timestamp: i64,
}

impl WindowAggregator {
    /// `interval_secs` must be strictly positive.
    pub fn new(interval_secs: u64) -> Result<Self> {
        if interval_secs == 0 {
            return Err(GatekeeperError::BadRequest(
                "interval_seconds must be positive".into(),
            ));
        }
        Ok(Self {
            interval: Duration::from_secs(interval_secs),
            by_consumer: BTreeMap::new(),
            by_method: BTreeMap::new(),
            last_timestamp: 0,
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn record(&mut self, ev: &AuditEvent) {
        *self.by_consumer.entry(ev.consumer.to_string()).or_insert(0) += 1;
        *self.by_method.entry(ev.method.to_string()).or_insert(0) += 1;
    }

    /// Take the current window and reset the counters.
    pub fn flush(&mut self) -> StatSnapshot {
        // wall clock can step backwards; snapshots must not
        self.last_timestamp = self.last_timestamp.max(unix_now());
        StatSnapshot {
            timestamp: self.last_timestamp,
            by_method: std::mem::take(&mut self.by_method),
            by_consumer: std::mem::take(&mut self.by_consumer),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.by_consumer.is_empty() && self.by_method.is_empty()
    }

    /// Run the aggregator over `sub` on its own task.
    ///
    /// The task ends when the returned receiver is dropped or the subscription
    /// closes; the subscription is released with it.
    pub fn spawn(self, sub: Subscription) -> mpsc::Receiver<StatSnapshot> {
        let (tx, rx) = mpsc::channel(SNAPSHOT_QUEUE);
        tokio::spawn(self.run(sub, tx));
        rx
    }

    async fn run(mut self, mut sub: Subscription, out: mpsc::Sender<StatSnapshot>) {
        let mut tick = interval_at(Instant::now() + self.interval, self.interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = out.closed() => break,

                _ = tick.tick() => {
                    // events already queued belong to the closing window
                    while let Some(ev) = sub.try_recv() {
                        self.record(&ev);
                    }
                    if out.send(self.flush()).await.is_err() {
                        break;
                    }
                }

                ev = sub.recv() => match ev {
                    Some(ev) => self.record(&ev),
                    None => break,
                },
            }
        }

        tracing::debug!(sub_id = sub.id(), "window aggregator stopped");
    }
}
