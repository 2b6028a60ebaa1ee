//! Realtime audit feeds.
//!
//! Two `EventBus` instances (log, stat) fan audit events out to long-lived
//! admin streams; `WindowAggregator` turns a stat subscription into periodic
//! snapshots.

pub mod bus;
pub mod registry;
pub mod types;
pub mod window;

pub use bus::{EventBus, Subscription};
pub use registry::SubscriptionRegistry;
pub use types::{BusConfig, Feed};
pub use window::WindowAggregator;
