//! Event bus fan-out, ordering, and subscriber lifecycle.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use gatekeeper_core::protocol::AuditEvent;
use gatekeeper_gateway::realtime::{BusConfig, EventBus, Feed};

fn ev(consumer: &str, method: &str) -> AuditEvent {
    AuditEvent::new(consumer, method)
}

fn cfg(queue_capacity: usize, send_timeout_ms: u64) -> BusConfig {
    BusConfig {
        queue_capacity,
        send_timeout: Duration::from_millis(send_timeout_ms),
    }
}

#[tokio::test]
async fn every_subscriber_sees_every_event_in_order() {
    let bus = EventBus::spawn(Feed::Log, BusConfig::default());
    let mut subs: Vec<_> = (0..5).map(|_| bus.subscribe()).collect();

    for i in 0..20 {
        bus.publish(ev("consumer1", &format!("/main.Biz/M{i}"))).await.unwrap();
    }

    for sub in &mut subs {
        for i in 0..20 {
            let got = sub.recv().await.unwrap();
            assert_eq!(&*got.method, format!("/main.Biz/M{i}"));
        }
        assert!(sub.try_recv().is_none(), "no duplicates");
    }
    assert_eq!(bus.published_count(), 20);
}

#[tokio::test]
async fn concurrent_publishers_share_one_global_order() {
    let bus = EventBus::spawn(Feed::Stat, cfg(512, 1000));
    let mut subs: Vec<_> = (0..3).map(|_| bus.subscribe()).collect();

    let mut tasks = Vec::new();
    for p in 0..4 {
        let bus = Arc::clone(&bus);
        tasks.push(tokio::spawn(async move {
            for i in 0..25 {
                bus.publish(ev(&format!("c{p}"), &format!("/main.Biz/{p}-{i}")))
                    .await
                    .unwrap();
            }
        }));
    }
    for t in tasks {
        t.await.unwrap();
    }

    let mut seqs = Vec::new();
    for sub in &mut subs {
        let mut seq = Vec::new();
        while let Some(e) = sub.try_recv() {
            seq.push(e.method.to_string());
        }
        seqs.push(seq);
    }

    assert_eq!(seqs[0].len(), 100);
    let unique: HashSet<_> = seqs[0].iter().collect();
    assert_eq!(unique.len(), 100, "each event exactly once");
    assert!(seqs.iter().all(|s| s == &seqs[0]), "same order for every subscriber");

    // per-publisher order survives interleaving
    for p in 0..4 {
        let mine: Vec<_> = seqs[0]
            .iter()
            .filter(|m| m.starts_with(&format!("/main.Biz/{p}-")))
            .cloned()
            .collect();
        let expected: Vec<_> = (0..25).map(|i| format!("/main.Biz/{p}-{i}")).collect();
        assert_eq!(mine, expected);
    }
}

#[tokio::test]
async fn late_subscriber_only_sees_later_events() {
    let bus = EventBus::spawn(Feed::Log, BusConfig::default());
    let mut early = bus.subscribe();

    bus.publish(ev("a", "/main.Biz/Check")).await.unwrap();
    let mut late = bus.subscribe();
    bus.publish(ev("a", "/main.Biz/Add")).await.unwrap();

    assert_eq!(&*early.recv().await.unwrap().method, "/main.Biz/Check");
    assert_eq!(&*early.recv().await.unwrap().method, "/main.Biz/Add");
    assert_eq!(&*late.recv().await.unwrap().method, "/main.Biz/Add");
    assert!(late.try_recv().is_none());
}

#[tokio::test]
async fn dropped_subscription_does_not_block_publish() {
    let bus = EventBus::spawn(Feed::Log, cfg(1, 60_000));
    let gone = bus.subscribe();
    let mut alive = bus.subscribe();
    drop(gone);
    assert_eq!(bus.subscriber_count(), 1);

    for _ in 0..3 {
        tokio::time::timeout(Duration::from_secs(1), bus.publish(ev("a", "/main.Biz/Check")))
            .await
            .expect("publish must not wait on a dropped subscriber")
            .unwrap();
        alive.recv().await.unwrap();
    }
}

#[tokio::test]
async fn unsubscribe_is_idempotent_and_final() {
    let bus = EventBus::spawn(Feed::Log, BusConfig::default());
    let mut sub = bus.subscribe();

    bus.publish(ev("a", "/main.Biz/Check")).await.unwrap();
    bus.unsubscribe(&mut sub);
    bus.unsubscribe(&mut sub);
    assert_eq!(bus.subscriber_count(), 0);

    // queued event is not surfaced after close
    assert!(sub.recv().await.is_none());

    bus.publish(ev("a", "/main.Biz/Add")).await.unwrap();
    assert!(sub.try_recv().is_none());
}

#[tokio::test(start_paused = true)]
async fn stalled_subscriber_is_evicted_after_timeout() {
    let bus = EventBus::spawn(Feed::Log, cfg(1, 100));
    let mut stalled = bus.subscribe();

    // fills the queue
    bus.publish(ev("a", "/main.Biz/Check")).await.unwrap();
    // waits send_timeout, then evicts
    bus.publish(ev("a", "/main.Biz/Add")).await.unwrap();

    assert_eq!(bus.evicted_count(), 1);
    assert_eq!(bus.subscriber_count(), 0);
    assert!(stalled.is_closed());

    // what was queued before eviction is still delivered, then the stream ends
    let kept = stalled.recv().await.expect("queued event survives eviction");
    assert_eq!(&*kept.method, "/main.Biz/Check");
    assert!(stalled.recv().await.is_none());
    assert!(stalled.try_recv().is_none());

    // nothing left to wait on
    tokio::time::timeout(Duration::from_millis(10), bus.publish(ev("a", "/main.Biz/Test")))
        .await
        .expect("publish after eviction must be immediate")
        .unwrap();
}

#[tokio::test(start_paused = true)]
async fn evicted_subscriber_drains_its_queue_in_order() {
    let bus = EventBus::spawn(Feed::Log, cfg(2, 50));
    let mut stalled = bus.subscribe();
    let mut live = bus.subscribe();

    let reader = tokio::spawn(async move {
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(live.recv().await.unwrap().method.to_string());
        }
        seen
    });

    for m in ["/main.Biz/Check", "/main.Biz/Add", "/main.Biz/Test", "/main.Biz/Check"] {
        bus.publish(ev("a", m)).await.unwrap();
    }
    assert_eq!(bus.evicted_count(), 1);

    let mut drained = Vec::new();
    while let Some(e) = stalled.recv().await {
        drained.push(e.method.to_string());
    }
    assert_eq!(drained, vec!["/main.Biz/Check", "/main.Biz/Add"]);

    assert_eq!(
        reader.await.unwrap(),
        vec!["/main.Biz/Check", "/main.Biz/Add", "/main.Biz/Test", "/main.Biz/Check"]
    );
}

#[tokio::test]
async fn shutdown_closes_subscribers_and_rejects_publish() {
    let bus = EventBus::spawn(Feed::Stat, BusConfig::default());
    let mut a = bus.subscribe();
    let mut b = bus.subscribe();

    bus.shutdown();

    assert!(a.recv().await.is_none());
    assert!(b.recv().await.is_none());
    assert!(bus.publish(ev("a", "/main.Biz/Check")).await.is_err());

    let mut late = bus.subscribe();
    assert!(late.recv().await.is_none());
}
