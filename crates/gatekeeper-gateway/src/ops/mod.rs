//! Ops endpoints. They sit outside the interceptor, so they need no
//! `consumer` header and are never audited.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::app_state::AppState;

const PROMETHEUS_TEXT: &str = "text/plain; version=0.0.4; charset=utf-8";

pub async fn healthz() -> &'static str {
    "ok"
}

/// Ready while both audit feeds accept subscribers and shutdown has not begun.
pub async fn readyz(State(app): State<AppState>) -> (StatusCode, String) {
    if app.is_draining() {
        return (StatusCode::SERVICE_UNAVAILABLE, "draining".into());
    }
    let stopped = app.stopped_feeds();
    if !stopped.is_empty() {
        let names: Vec<&str> = stopped.iter().map(|f| f.as_str()).collect();
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            format!("audit feed stopped: {}", names.join(",")),
        );
    }
    (StatusCode::OK, "ready".into())
}

/// Call counters and stream gauges, followed by per-feed bus series.
pub async fn metrics(State(app): State<AppState>) -> Response {
    let body = app.metrics().render(&app.metrics_extra());
    ([(header::CONTENT_TYPE, PROMETHEUS_TEXT)], body).into_response()
}
