//! gatekeeper gateway library entry.
//!
//! This crate wires consumer authorization, the two audit busses, window
//! statistics, and the HTTP/WebSocket transport into one server. It is
//! consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod intercept;
pub mod obs;
pub mod ops;
pub mod policy;
pub mod realtime;
pub mod router;
pub mod server;
pub mod services;
pub mod transport;
