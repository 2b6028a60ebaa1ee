//! Audit records and admin stream frames.
//!
//! `AuditEvent` is the in-process record fanned out on both feeds. `LogFrame`
//! and `StatSnapshot` are what admin streams put on the wire (one JSON object
//! per frame).

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Immutable record of one authorized call.
///
/// Cloning is cheap: string fields are shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    pub consumer: Arc<str>,
    pub method: Arc<str>,
    /// Unix seconds.
    pub timestamp: i64,
}

impl AuditEvent {
    pub fn new(consumer: impl Into<Arc<str>>, method: impl Into<Arc<str>>) -> Self {
        Self {
            consumer: consumer.into(),
            method: method.into(),
            timestamp: unix_now(),
        }
    }

    /// Render for a `Logging` stream, tagging the reporting host.
    pub fn to_log_frame(&self, host: &str) -> LogFrame {
        LogFrame {
            timestamp: self.timestamp,
            consumer: self.consumer.to_string(),
            method: self.method.to_string(),
            host: host.to_string(),
        }
    }
}

/// Wire shape of one `Logging` stream message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFrame {
    pub timestamp: i64,
    pub consumer: String,
    pub method: String,
    pub host: String,
}

/// Wire shape of one `Statistics` stream message: counts for one window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatSnapshot {
    pub timestamp: i64,
    #[serde(default)]
    pub by_method: BTreeMap<String, u64>,
    #[serde(default)]
    pub by_consumer: BTreeMap<String, u64>,
}

/// JSON error body returned to callers (HTTP body or final stream frame).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub msg: String,
}

impl From<&crate::GatekeeperError> for ErrorBody {
    fn from(e: &crate::GatekeeperError) -> Self {
        Self {
            code: e.client_code().as_str().to_string(),
            msg: e.to_string(),
        }
    }
}

/// Current wall clock as unix seconds (0 if the clock is before the epoch).
pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}
