use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use gatekeeper_core::error::{GatekeeperError, Result};
use gatekeeper_core::protocol::AuditEvent;

use crate::app_state::AppState;
use crate::context::CallContext;
use crate::policy::AuthorizationGate;
use crate::realtime::{EventBus, Feed};
use crate::transport::error_response;

use super::routing::lookup;

/// Authorization + audit publication wrapped around every RPC.
pub struct Interceptor {
    gate: AuthorizationGate,
    log_bus: Arc<EventBus>,
    stat_bus: Arc<EventBus>,
}

impl Interceptor {
    pub fn new(gate: AuthorizationGate, log_bus: Arc<EventBus>, stat_bus: Arc<EventBus>) -> Self {
        Self {
            gate,
            log_bus,
            stat_bus,
        }
    }

    pub fn bus(&self, feed: Feed) -> &Arc<EventBus> {
        match feed {
            Feed::Log => &self.log_bus,
            Feed::Stat => &self.stat_bus,
        }
    }

    /// Authorize the call and publish its audit event to the feeds the method
    /// table names. Nothing is published for a method the gateway does not
    /// serve or when authorization fails.
    pub async fn admit(&self, metadata: &HeaderMap, full_method: &str) -> Result<CallContext> {
        let spec = lookup(full_method)
            .ok_or_else(|| GatekeeperError::UnknownMethod(full_method.to_string()))?;

        let identity = self.gate.authorize(metadata)?;
        self.gate.check_permission(&identity, full_method)?;

        let ctx = CallContext::new(identity, spec.path);
        let event = AuditEvent::new(ctx.identity.shared(), Arc::clone(&ctx.method));
        for feed in spec.feeds {
            self.bus(*feed).publish(event.clone()).await?;
        }
        Ok(ctx)
    }
}

/// Axum middleware: admit the call, then hand it to the route handler with its
/// `CallContext` attached. The handler's response is returned unchanged.
pub async fn intercept(State(app): State<AppState>, mut req: Request, next: Next) -> Response {
    let full_method = req.uri().path().to_owned();
    // bounded label set for metrics
    let label = lookup(&full_method).map(|m| m.path).unwrap_or("other");

    let admitted = app.interceptor().admit(req.headers(), &full_method).await;
    match admitted {
        Ok(ctx) => {
            app.metrics().calls.inc(&[("method", label), ("outcome", "admitted")]);
            req.extensions_mut().insert(ctx);
            next.run(req).await
        }
        Err(e) => {
            let outcome = e.client_code().as_str();
            app.metrics().calls.inc(&[("method", label), ("outcome", outcome)]);
            tracing::warn!(method = %full_method, error = %e, "call rejected");
            error_response(&e)
        }
    }
}
