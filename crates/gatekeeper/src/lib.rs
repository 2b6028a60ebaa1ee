//! Top-level facade crate for gatekeeper.
//!
//! Re-exports core types and the gateway library so users can depend on a single crate.

pub mod core {
    pub use gatekeeper_core::*;
}

pub mod gateway {
    pub use gatekeeper_gateway::*;
}
