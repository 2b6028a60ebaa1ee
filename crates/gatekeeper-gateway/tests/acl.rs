//! Permission table and authorization gate behaviour.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use axum::http::{HeaderMap, HeaderValue};

use gatekeeper_core::error::{ClientCode, GatekeeperError};
use gatekeeper_gateway::policy::{AuthorizationGate, Identity, PermissionTable, CONSUMER_KEY};

const ACL: &str = r#"{
    "logger":    ["/main.Admin/Logging"],
    "stat":      ["/main.Admin/Statistics"],
    "biz_user":  ["/main.Biz/Check", "/main.Biz/Add"],
    "biz_admin": ["/main.Biz/*"],
    "nobody":    []
}"#;

fn gate() -> AuthorizationGate {
    AuthorizationGate::new(Arc::new(PermissionTable::from_json(ACL).unwrap()))
}

fn headers(values: &[&str]) -> HeaderMap {
    let mut h = HeaderMap::new();
    for v in values {
        h.append(CONSUMER_KEY, HeaderValue::from_str(v).unwrap());
    }
    h
}

#[test]
fn malformed_acl_is_config_error() {
    for bad in [
        "not json",
        "[]",
        r#"["biz_user"]"#,
        r#"{"biz_user": "/main.Biz/Check"}"#,
        r#"{"biz_user": [1, 2]}"#,
        r#"{"biz_user": {"m": "/main.Biz/Check"}}"#,
    ] {
        let err = PermissionTable::from_json(bad).expect_err(bad);
        assert!(matches!(err, GatekeeperError::Config(_)), "{bad}: {err}");
    }
}

#[test]
fn empty_acl_is_valid() {
    let table = PermissionTable::from_json("{}").unwrap();
    assert!(table.is_empty());
    assert!(!table.is_allowed("anyone", "/main.Biz/Check"));
}

#[test]
fn authorize_requires_exactly_one_consumer() {
    let g = gate();

    let err = g.authorize(&HeaderMap::new()).unwrap_err();
    assert_eq!(err.client_code(), ClientCode::Unauthenticated);

    let err = g.authorize(&headers(&["biz_user", "biz_admin"])).unwrap_err();
    assert_eq!(err.client_code(), ClientCode::Unauthenticated);

    let id = g.authorize(&headers(&["biz_user"])).unwrap();
    assert_eq!(id.as_str(), "biz_user");
}

#[test]
fn non_utf8_consumer_is_unauthenticated() {
    let mut h = HeaderMap::new();
    h.insert(CONSUMER_KEY, HeaderValue::from_bytes(&[0xfa, 0xfb]).unwrap());
    let err = gate().authorize(&h).unwrap_err();
    assert_eq!(err.client_code(), ClientCode::Unauthenticated);
}

#[test]
fn permission_matrix() {
    let g = gate();
    let methods = [
        "/main.Biz/Check",
        "/main.Biz/Add",
        "/main.Biz/Test",
        "/main.Admin/Logging",
        "/main.Admin/Statistics",
    ];
    let expect: &[(&str, &[&str])] = &[
        ("logger", &["/main.Admin/Logging"]),
        ("stat", &["/main.Admin/Statistics"]),
        ("biz_user", &["/main.Biz/Check", "/main.Biz/Add"]),
        ("biz_admin", &["/main.Biz/Check", "/main.Biz/Add", "/main.Biz/Test"]),
        ("nobody", &[]),
        ("unknown", &[]),
    ];

    for (consumer, allowed) in expect {
        let id = Identity::new(*consumer);
        for m in methods {
            let res = g.check_permission(&id, m);
            if allowed.contains(&m) {
                assert!(res.is_ok(), "{consumer} should be allowed {m}");
            } else {
                let err = res.expect_err(&format!("{consumer} should be denied {m}"));
                assert_eq!(err.to_string(), "unauthenticated: permission denied");
            }
        }
    }
}

#[test]
fn wildcard_does_not_leak_across_services() {
    let table = PermissionTable::from_json(r#"{"c": ["/main.Biz/*"]}"#).unwrap();
    assert!(table.is_allowed("c", "/main.Biz/Whatever"));
    assert!(!table.is_allowed("c", "/main.Admin/Logging"));
    assert!(!table.is_allowed("c", "/other.Biz/Check"));
}
