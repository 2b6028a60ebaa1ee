//! Interceptor pipeline: consumer authorization and audit publication for
//! unary and streaming calls alike.

pub mod pipeline;
pub mod routing;

pub use pipeline::{intercept, Interceptor};
pub use routing::{lookup, methods_of, CallKind, MethodSpec};
