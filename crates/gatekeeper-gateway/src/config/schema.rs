use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;
use gatekeeper_core::error::{GatekeeperError, Result};

use crate::policy::PermissionTable;
use crate::realtime::BusConfig;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub bus: BusSection,

    /// ACL document (JSON object: consumer -> [method pattern]).
    pub acl: String,
}

impl GatewayConfig {
    /// Minimal config for embedding and tests: defaults plus the given ACL.
    pub fn with_acl(listen: impl Into<String>, acl: impl Into<String>) -> Self {
        Self {
            version: 1,
            gateway: GatewaySection {
                listen: listen.into(),
                ..GatewaySection::default()
            },
            bus: BusSection::default(),
            acl: acl.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(GatekeeperError::Config(format!(
                "unsupported config version: {}",
                self.version
            )));
        }

        self.gateway.validate()?;
        self.bus.validate()?;

        // fail before the listener opens
        PermissionTable::from_json(&self.acl)?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Address reported in `Logging` events. Defaults to `listen`.
    #[serde(default)]
    pub host: Option<String>,

    #[serde(default = "default_ping_interval_ms")]
    pub ping_interval_ms: u64,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            host: None,
            ping_interval_ms: default_ping_interval_ms(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if !(1000..=120000).contains(&self.ping_interval_ms) {
            return Err(GatekeeperError::Config(
                "gateway.ping_interval_ms must be between 1000 and 120000".into(),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            GatekeeperError::Config(format!("gateway.listen must be a valid SocketAddr: {e}"))
        })
    }

    pub fn reported_host(&self) -> &str {
        self.host.as_deref().unwrap_or(&self.listen)
    }
}

fn default_listen() -> String {
    "127.0.0.1:8082".into()
}
fn default_ping_interval_ms() -> u64 {
    20000
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BusSection {
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    #[serde(default = "default_send_timeout_ms")]
    pub send_timeout_ms: u64,
}

impl Default for BusSection {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            send_timeout_ms: default_send_timeout_ms(),
        }
    }
}

impl BusSection {
    pub fn validate(&self) -> Result<()> {
        if !(1..=65536).contains(&self.queue_capacity) {
            return Err(GatekeeperError::Config(
                "bus.queue_capacity must be between 1 and 65536".into(),
            ));
        }
        if !(1..=60000).contains(&self.send_timeout_ms) {
            return Err(GatekeeperError::Config(
                "bus.send_timeout_ms must be between 1 and 60000".into(),
            ));
        }
        Ok(())
    }

    pub fn to_bus_config(&self) -> BusConfig {
        BusConfig {
            queue_capacity: self.queue_capacity,
            send_timeout: Duration::from_millis(self.send_timeout_ms),
        }
    }
}

fn default_queue_capacity() -> usize {
    64
}
fn default_send_timeout_ms() -> u64 {
    1000
}
