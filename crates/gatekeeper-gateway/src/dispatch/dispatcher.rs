use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

use gatekeeper_core::error::{GatekeeperError, Result};

use crate::context::CallContext;

/// Unary business handler bound to one full method path.
#[async_trait]
pub trait UnaryService: Send + Sync {
    fn method(&self) -> &'static str;
    async fn call(&self, ctx: CallContext) -> Result<Value>;
}

/// Registry and dispatcher for unary handlers, keyed by full method path.
#[derive(Default)]
pub struct Dispatcher {
    unary: DashMap<&'static str, Arc<dyn UnaryService>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            unary: DashMap::new(),
        }
    }

    pub fn register_unary(&self, svc: Arc<dyn UnaryService>) {
        self.unary.insert(svc.method(), svc);
    }

    pub fn registered_methods(&self) -> Vec<&'static str> {
        self.unary.iter().map(|e| *e.key()).collect()
    }

    /// Run the handler for `ctx.method`; its result is returned unchanged.
    pub async fn dispatch(&self, ctx: CallContext) -> Result<Value> {
        let handler = self
            .unary
            .get(ctx.method())
            .ok_or_else(|| GatekeeperError::UnknownMethod(ctx.method().to_string()))?
            .value()
            .clone();
        handler.call(ctx).await
    }
}
