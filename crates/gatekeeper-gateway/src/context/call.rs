use std::sync::Arc;

use crate::policy::Identity;

/// Immutable metadata for one admitted call (who called what).
#[derive(Debug, Clone)]
pub struct CallContext {
    pub identity: Identity,
    /// Full method path, e.g. `/main.Biz/Check`.
    pub method: Arc<str>,
}

impl CallContext {
    pub fn new(identity: Identity, method: impl Into<Arc<str>>) -> Self {
        Self {
            identity,
            method: method.into(),
        }
    }

    pub fn consumer(&self) -> &str {
        self.identity.as_str()
    }

    pub fn method(&self) -> &str {
        &self.method
    }
}
