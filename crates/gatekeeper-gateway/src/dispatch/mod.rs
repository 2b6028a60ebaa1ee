//! Dispatcher module exports.
//!
//! Re-exports the dispatcher and handler trait so downstream consumers can
//! depend on this module directly.

pub mod dispatcher;

pub use dispatcher::{Dispatcher, UnaryService};
