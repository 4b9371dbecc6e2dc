//! Shared application state.

use std::sync::Arc;

use tmf683_core::clock::Clock;
use tmf683_core::event_log::EventLogStore;
use tmf683_core::id::IdGenerator;
use tmf683_event_bus::DomainEventBus;
use tmf683_party_interaction::domain::repository::PartyInteractionRepository;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Clock for timestamps.
    pub clock: Arc<dyn Clock>,
    /// Generator for aggregate and correlation ids.
    pub ids: Arc<dyn IdGenerator>,
    /// Party interaction store.
    pub interactions: Arc<dyn PartyInteractionRepository>,
    /// Durable event log, also written by the bus.
    pub event_log: Arc<dyn EventLogStore>,
    /// Domain event bus.
    pub event_bus: Arc<DomainEventBus>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        interactions: Arc<dyn PartyInteractionRepository>,
        event_log: Arc<dyn EventLogStore>,
        event_bus: Arc<DomainEventBus>,
    ) -> Self {
        Self {
            clock,
            ids,
            interactions,
            event_log,
            event_bus,
        }
    }
}
