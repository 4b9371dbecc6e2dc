//! Event listeners reacting to party interaction events.
//!
//! These are the integration points for side effects such as notifications,
//! cache invalidation, or sync with external systems. Today they decode the
//! payload and log it.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tmf683_core::error::DomainError;
use tmf683_core::event::{DomainEvent, EventType};
use tmf683_core::handler::EventHandler;
use tmf683_event_bus::DomainEventBus;
use tracing::info;

use crate::domain::aggregates::PartyInteraction;
use crate::domain::events::{PartyInteractionDeleted, PartyInteractionUpdated};

fn decode<T: DeserializeOwned>(event: &DomainEvent) -> Result<T, DomainError> {
    serde_json::from_value(event.payload.clone()).map_err(|e| {
        DomainError::Infrastructure(format!(
            "malformed {} payload in event {}: {e}",
            event.event_type, event.id
        ))
    })
}

/// Logs newly created interactions.
#[derive(Debug, Default)]
pub struct InteractionCreatedListener;

#[async_trait]
impl EventHandler for InteractionCreatedListener {
    fn name(&self) -> &str {
        "interaction_created_listener"
    }

    async fn handle(&self, event: &DomainEvent) -> Result<(), DomainError> {
        let interaction: PartyInteraction = decode(event)?;
        info!(
            event_id = %event.id,
            interaction_id = %interaction.id,
            channel = %interaction.channel_name,
            description = %interaction.description,
            "party interaction created"
        );
        Ok(())
    }
}

/// Logs the fields changed by an update.
#[derive(Debug, Default)]
pub struct InteractionUpdatedListener;

#[async_trait]
impl EventHandler for InteractionUpdatedListener {
    fn name(&self) -> &str {
        "interaction_updated_listener"
    }

    async fn handle(&self, event: &DomainEvent) -> Result<(), DomainError> {
        let payload: PartyInteractionUpdated = decode(event)?;
        let changed: Vec<&str> = payload.changes.keys().map(String::as_str).collect();
        info!(
            event_id = %event.id,
            interaction_id = %payload.id,
            changed = ?changed,
            "party interaction updated"
        );
        Ok(())
    }
}

/// Logs deletions.
#[derive(Debug, Default)]
pub struct InteractionDeletedListener;

#[async_trait]
impl EventHandler for InteractionDeletedListener {
    fn name(&self) -> &str {
        "interaction_deleted_listener"
    }

    async fn handle(&self, event: &DomainEvent) -> Result<(), DomainError> {
        let payload: PartyInteractionDeleted = decode(event)?;
        info!(
            event_id = %event.id,
            interaction_id = %payload.id,
            deleted_at = %payload.deleted_at,
            "party interaction deleted"
        );
        Ok(())
    }
}

/// Registers one listener per party interaction event type.
pub fn register_event_listeners(bus: &DomainEventBus) {
    bus.subscribe(
        EventType::PartyInteractionCreated,
        Arc::new(InteractionCreatedListener),
    );
    bus.subscribe(
        EventType::PartyInteractionUpdated,
        Arc::new(InteractionUpdatedListener),
    );
    bus.subscribe(
        EventType::PartyInteractionDeleted,
        Arc::new(InteractionDeletedListener),
    );
    info!("party interaction event listeners registered");
}
