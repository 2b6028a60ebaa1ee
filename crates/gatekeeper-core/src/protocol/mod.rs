//! Protocol modules.
//!
//! - `method`: fully-qualified RPC method paths of the business and admin surfaces.
//! - `event`: audit records and the JSON frames streamed to admin subscribers.

pub mod event;
pub mod method;

pub use event::{AuditEvent, ErrorBody, LogFrame, StatSnapshot};
