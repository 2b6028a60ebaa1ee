use std::collections::HashMap;

use serde_json::value::RawValue;

use gatekeeper_core::error::{GatekeeperError, Result};

use super::allowlist::{compile_method_rules, is_method_allowed, MethodRule};

/// Consumer -> allowed method rules.
/// Built once at startup from ACL JSON, then shared read-only via Arc.
#[derive(Debug, Default)]
pub struct PermissionTable {
    consumers: HashMap<String, Vec<MethodRule>>,
}

impl PermissionTable {
    /// Parse an ACL document: a JSON object mapping consumer name to an array
    /// of method patterns. Anything else is a `Config` error.
    pub fn from_json(acl: &str) -> Result<Self> {
        let raw: HashMap<String, Box<RawValue>> = serde_json::from_str(acl)
            .map_err(|e| GatekeeperError::Config(format!("acl must be a json object: {e}")))?;

        let mut consumers = HashMap::with_capacity(raw.len());
        for (consumer, v) in raw {
            let patterns: Vec<String> = serde_json::from_str(v.get()).map_err(|e| {
                GatekeeperError::Config(format!(
                    "acl entry for consumer {consumer} must be an array of strings: {e}"
                ))
            })?;
            consumers.insert(consumer, compile_method_rules(&patterns));
        }
        Ok(Self { consumers })
    }

    pub fn rules(&self, consumer: &str) -> Option<&[MethodRule]> {
        self.consumers.get(consumer).map(Vec::as_slice)
    }

    pub fn is_allowed(&self, consumer: &str, full_method: &str) -> bool {
        self.rules(consumer)
            .map(|rules| is_method_allowed(rules, full_method))
            .unwrap_or(false)
    }

    pub fn consumers(&self) -> impl Iterator<Item = (&str, &[MethodRule])> {
        self.consumers.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.consumers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.consumers.is_empty()
    }
}
