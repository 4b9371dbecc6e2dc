//! Event bus configuration.

use std::num::NonZeroUsize;
use std::time::Duration;

/// History capacity used when none is configured.
pub const DEFAULT_HISTORY_CAPACITY: NonZeroUsize = NonZeroUsize::new(1000).unwrap();

/// Tunables for a [`DomainEventBus`](crate::DomainEventBus).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventBusConfig {
    /// Maximum number of events retained in the in-memory history.
    pub history_capacity: NonZeroUsize,
    /// Upper bound on a single handler invocation. `None` leaves handlers
    /// unbounded.
    pub handler_timeout: Option<Duration>,
}

impl EventBusConfig {
    /// Returns a copy with a different history capacity.
    #[must_use]
    pub fn with_history_capacity(mut self, capacity: NonZeroUsize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// Returns a copy that aborts handlers running longer than `timeout`.
    #[must_use]
    pub fn with_handler_timeout(mut self, timeout: Duration) -> Self {
        self.handler_timeout = Some(timeout);
        self
    }
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            handler_timeout: None,
        }
    }
}
