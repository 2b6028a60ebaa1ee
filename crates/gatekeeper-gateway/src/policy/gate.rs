use std::fmt;
use std::sync::Arc;

use axum::http::HeaderMap;

use gatekeeper_core::error::{GatekeeperError, Result};

use super::table::PermissionTable;

/// Metadata key carrying the caller's consumer name.
pub const CONSUMER_KEY: &str = "consumer";

/// Authenticated caller (consumer name).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity(Arc<str>);

impl Identity {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn shared(&self) -> Arc<str> {
        Arc::clone(&self.0)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifies callers from metadata and evaluates the permission table.
#[derive(Debug)]
pub struct AuthorizationGate {
    table: Arc<PermissionTable>,
}

impl AuthorizationGate {
    pub fn new(table: Arc<PermissionTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &PermissionTable {
        &self.table
    }

    /// Exactly one `consumer` value is required.
    pub fn authorize(&self, metadata: &HeaderMap) -> Result<Identity> {
        let mut values = metadata.get_all(CONSUMER_KEY).iter();
        let first = values
            .next()
            .ok_or_else(|| GatekeeperError::Unauthenticated("can not get metadata".into()))?;
        if values.next().is_some() {
            return Err(GatekeeperError::Unauthenticated(
                "multiple consumer values".into(),
            ));
        }
        let name = first.to_str().map_err(|_| {
            GatekeeperError::Unauthenticated("consumer metadata is not valid utf-8".into())
        })?;
        Ok(Identity::new(name))
    }

    pub fn check_permission(&self, identity: &Identity, full_method: &str) -> Result<()> {
        if self.table.is_allowed(identity.as_str(), full_method) {
            Ok(())
        } else {
            Err(GatekeeperError::permission_denied())
        }
    }
}
