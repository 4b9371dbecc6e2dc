//! TMF683 Event Bus: in-process publish/subscribe for domain events.
//!
//! [`DomainEventBus`] persists every published event to an injected
//! [`EventLogStore`](tmf683_core::event_log::EventLogStore), keeps a bounded
//! history of recent events, and dispatches to registered handlers on
//! detached tasks so publishers never wait on listeners.

mod bus;
mod config;
mod dispatch;

pub use bus::{BusStats, DomainEventBus};
pub use config::{DEFAULT_HISTORY_CAPACITY, EventBusConfig};
