//! Clock abstraction for deterministic timestamps.

use chrono::{DateTime, Utc};

/// Source of the current instant. Supplies default event timestamps and
/// mutation times.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
