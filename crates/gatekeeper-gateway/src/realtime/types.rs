use std::fmt;
use std::time::Duration;

/// Which audit feed a bus carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feed {
    /// Raw per-call records relayed by `Logging` streams.
    Log,
    /// Records counted by `Statistics` window aggregators.
    Stat,
}

impl Feed {
    pub fn as_str(self) -> &'static str {
        match self {
            Feed::Log => "log",
            Feed::Stat => "stat",
        }
    }
}

impl fmt::Display for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivery settings shared by every subscriber of a bus.
///
/// Overflow policy: block-with-timeout, then evict. The dispatcher waits up to
/// `send_timeout` for room in a full subscriber queue; a subscriber still full
/// after that is unregistered and closed, so it never sees a gap.
#[derive(Debug, Clone, Copy)]
pub struct BusConfig {
    pub queue_capacity: usize,
    pub send_timeout: Duration,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 64,
            send_timeout: Duration::from_millis(1000),
        }
    }
}
