//! Shared application state for the gatekeeper gateway.
//!
//! Owns the permission table, both audit busses, the interceptor, and the
//! unary dispatcher. Construction spawns the bus dispatchers, so it must run
//! inside a tokio runtime.

use std::sync::Arc;

use gatekeeper_core::error::Result;
use gatekeeper_core::protocol::method::split_full_method;

use crate::config::GatewayConfig;
use crate::dispatch::Dispatcher;
use crate::intercept::{self, CallKind, Interceptor};
use crate::obs::GatewayMetrics;
use crate::policy::{AuthorizationGate, MethodRule, PermissionTable};
use crate::realtime::{EventBus, Feed};
use crate::services::BizService;

const FAIL_FAST_ON_MISMATCH: bool = false; // if changed to true, boot fails.

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    host: Arc<str>,
    interceptor: Interceptor,
    dispatcher: Dispatcher,
    metrics: GatewayMetrics,
}

impl AppState {
    /// Build application state.
    /// Returns Result so main can handle errors gracefully (no panic).
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        // 1) Permission table (read-only from here on)
        let table = Arc::new(PermissionTable::from_json(&cfg.acl)?);
        warn_on_unknown_rules(&table)?;

        // 2) Audit busses
        let bus_cfg = cfg.bus.to_bus_config();
        let log_bus = EventBus::spawn(Feed::Log, bus_cfg);
        let stat_bus = EventBus::spawn(Feed::Stat, bus_cfg);

        let interceptor = Interceptor::new(AuthorizationGate::new(table), log_bus, stat_bus);

        // 3) Business handlers
        let dispatcher = Dispatcher::new();
        for svc in BizService::all() {
            dispatcher.register_unary(Arc::new(svc));
        }
        warn_on_missing_handlers(&dispatcher)?;

        let host: Arc<str> = Arc::from(cfg.gateway.reported_host());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                host,
                interceptor,
                dispatcher,
                metrics: GatewayMetrics::default(),
            }),
        })
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn interceptor(&self) -> &Interceptor {
        &self.inner.interceptor
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.inner.dispatcher
    }

    pub fn log_bus(&self) -> Arc<EventBus> {
        Arc::clone(self.inner.interceptor.bus(Feed::Log))
    }

    pub fn stat_bus(&self) -> Arc<EventBus> {
        Arc::clone(self.inner.interceptor.bus(Feed::Stat))
    }

    /// Address reported in `Logging` events.
    pub fn reported_host(&self) -> Arc<str> {
        Arc::clone(&self.inner.host)
    }

    pub fn metrics(&self) -> &GatewayMetrics {
        &self.inner.metrics
    }

    /// Bus-level series appended to the `/metrics` output.
    pub fn metrics_extra(&self) -> Vec<(String, u64)> {
        let mut out = Vec::with_capacity(6);
        for feed in [Feed::Log, Feed::Stat] {
            let bus = self.inner.interceptor.bus(feed);
            let f = feed.as_str();
            out.push((format!("gatekeeper_bus_published_total{{feed=\"{f}\"}}"), bus.published_count()));
            out.push((format!("gatekeeper_bus_evicted_total{{feed=\"{f}\"}}"), bus.evicted_count()));
            out.push((format!("gatekeeper_bus_subscribers{{feed=\"{f}\"}}"), bus.subscriber_count() as u64));
        }
        out
    }

    /// Feeds whose bus no longer accepts subscribers.
    pub fn stopped_feeds(&self) -> Vec<Feed> {
        [Feed::Log, Feed::Stat]
            .into_iter()
            .filter(|f| self.inner.interceptor.bus(*f).is_closed())
            .collect()
    }

    pub fn is_draining(&self) -> bool {
        self.inner.metrics.is_draining()
    }

    /// Mark draining and close every subscriber on both busses.
    pub fn shutdown(&self) {
        self.inner.metrics.set_draining();
        for feed in [Feed::Log, Feed::Stat] {
            self.inner.interceptor.bus(feed).shutdown();
        }
    }
}

/// ACL <-> method table sanity check.
fn warn_on_unknown_rules(table: &PermissionTable) -> Result<()> {
    for (consumer, rules) in table.consumers() {
        for rule in rules {
            let known = match rule {
                MethodRule::Exact(path) => intercept::lookup(path).is_some(),
                MethodRule::Service(svc) => intercept::routing::METHODS.iter().any(|m| {
                    split_full_method(m.path).map(|(s, _)| s == svc.as_str()).unwrap_or(false)
                }),
            };
            if !known {
                tracing::warn!(consumer = %consumer, rule = ?rule, "acl rule matches no registered method");
                if FAIL_FAST_ON_MISMATCH {
                    return Err(gatekeeper_core::GatekeeperError::Config(format!(
                        "acl for {consumer} references unknown method: {rule:?}"
                    )));
                }
            }
        }
    }
    Ok(())
}

/// Method table <-> dispatcher sanity check: every unary method needs a handler.
fn warn_on_missing_handlers(dispatcher: &Dispatcher) -> Result<()> {
    let registered = dispatcher.registered_methods();
    for m in intercept::methods_of(CallKind::Unary) {
        if !registered.contains(&m.path) {
            tracing::warn!(method = m.path, "unary method has no registered handler");
            if FAIL_FAST_ON_MISMATCH {
                return Err(gatekeeper_core::GatekeeperError::Config(format!(
                    "no handler registered for {}",
                    m.path
                )));
            }
        }
    }
    Ok(())
}
