//! Per-call context types shared across layers.
//!
//! The interceptor resolves a `CallContext` once and attaches it to the request
//! so handlers never re-read transport metadata.

pub mod call;

pub use call::CallContext;
