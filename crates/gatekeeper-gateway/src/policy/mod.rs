//! Policy layer (consumer identification and method allowlists).
//!
//! Compiles the ACL document into a read-only permission table that the
//! interceptor consults on every call.

pub mod allowlist;
pub mod gate;
pub mod table;

pub use allowlist::MethodRule;
pub use gate::{AuthorizationGate, Identity, CONSUMER_KEY};
pub use table::PermissionTable;
