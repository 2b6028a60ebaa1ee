//! gatekeeper core: transport-agnostic audit records, method names, and the
//! shared error surface.
//!
//! This crate defines the wire-level contracts consumed by the gateway and by
//! any client tooling. It carries no transport or runtime dependencies.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{GatekeeperError, Result};
