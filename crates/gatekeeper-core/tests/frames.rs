//! Wire shape checks for admin stream frames.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use gatekeeper_core::error::GatekeeperError;
use gatekeeper_core::protocol::{AuditEvent, ErrorBody, StatSnapshot};

#[test]
fn log_frame_carries_host_and_fields() {
    let ev = AuditEvent::new("logger", "/main.Admin/Logging");
    let frame = ev.to_log_frame("127.0.0.1:8083");
    let v = serde_json::to_value(&frame).unwrap();

    assert_eq!(v["consumer"], "logger");
    assert_eq!(v["method"], "/main.Admin/Logging");
    assert_eq!(v["host"], "127.0.0.1:8083");
    assert_eq!(v["timestamp"].as_i64().unwrap(), ev.timestamp);
}

#[test]
fn stat_snapshot_uses_snake_case_maps() {
    let mut snap = StatSnapshot { timestamp: 7, ..Default::default() };
    snap.by_method.insert("/main.Biz/Check".into(), 3);
    snap.by_consumer.insert("consumer1".into(), 3);

    let v = serde_json::to_value(&snap).unwrap();
    assert_eq!(v["by_method"]["/main.Biz/Check"], 3);
    assert_eq!(v["by_consumer"]["consumer1"], 3);
    assert_eq!(v["timestamp"], 7);
}

#[test]
fn empty_snapshot_parses_without_maps() {
    let snap: StatSnapshot = serde_json::from_str(r#"{"timestamp": 1}"#).unwrap();
    assert!(snap.by_method.is_empty());
    assert!(snap.by_consumer.is_empty());
}

#[test]
fn error_body_uses_client_code() {
    let body = ErrorBody::from(&GatekeeperError::permission_denied());
    assert_eq!(body.code, "UNAUTHENTICATED");
    assert_eq!(body.msg, "unauthenticated: permission denied");
}
