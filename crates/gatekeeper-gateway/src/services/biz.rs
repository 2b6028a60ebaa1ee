use async_trait::async_trait;
use serde_json::{json, Value};

use gatekeeper_core::error::Result;
use gatekeeper_core::protocol::method::{BIZ_ADD, BIZ_CHECK, BIZ_TEST};

use crate::context::CallContext;
use crate::dispatch::UnaryService;

/// `main.Biz` method with no payload and no business logic of its own.
/// Authorization and auditing happen in the interceptor.
pub struct BizService {
    method: &'static str,
}

impl BizService {
    pub fn new(method: &'static str) -> Self {
        Self { method }
    }

    pub fn all() -> [Self; 3] {
        [Self::new(BIZ_CHECK), Self::new(BIZ_ADD), Self::new(BIZ_TEST)]
    }
}

#[async_trait]
impl UnaryService for BizService {
    fn method(&self) -> &'static str {
        self.method
    }

    async fn call(&self, ctx: CallContext) -> Result<Value> {
        tracing::trace!(consumer = %ctx.consumer(), method = %ctx.method(), "biz call");
        Ok(json!({}))
    }
}
