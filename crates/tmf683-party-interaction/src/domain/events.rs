//! Domain events for the Party Interaction context.
//!
//! Each builder returns a [`NewEvent`] without an id; the bus assigns one at
//! publish time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tmf683_core::error::DomainError;
use tmf683_core::event::{AggregateType, EventType, NewEvent};

use super::aggregates::{PartyInteraction, PartyInteractionPatch};

/// Schema version of `PartyInteractionCreatedEvent`.
pub const CREATED_EVENT_VERSION: i32 = 1;
/// Schema version of `PartyInteractionUpdatedEvent`.
pub const UPDATED_EVENT_VERSION: i32 = 2;
/// Schema version of `PartyInteractionDeletedEvent`.
pub const DELETED_EVENT_VERSION: i32 = 3;

/// Payload of `PartyInteractionUpdatedEvent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyInteractionUpdated {
    /// The interaction that changed.
    pub id: String,
    /// The submitted fields.
    pub changes: Map<String, Value>,
    /// Description, type, status and every touched field, before the update.
    pub previous_values: Map<String, Value>,
}

/// Payload of `PartyInteractionDeletedEvent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyInteractionDeleted {
    /// The interaction that was removed.
    pub id: String,
    /// When it was removed.
    pub deleted_at: DateTime<Utc>,
}

fn to_payload<T: Serialize>(payload: &T) -> Result<Value, DomainError> {
    serde_json::to_value(payload)
        .map_err(|e| DomainError::Infrastructure(format!("failed to encode event payload: {e}")))
}

/// Builds the event announcing a newly created interaction. The payload is
/// the full record.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the record cannot be encoded.
pub fn interaction_created(
    interaction: &PartyInteraction,
    correlation_id: &str,
) -> Result<NewEvent, DomainError> {
    Ok(NewEvent::new(
        EventType::PartyInteractionCreated,
        AggregateType::PartyInteraction,
        interaction.id.clone(),
        CREATED_EVENT_VERSION,
        to_payload(interaction)?,
    )
    .with_timestamp(interaction.created_at)
    .with_correlation_id(correlation_id))
}

/// Builds the event announcing an update, from the record as it was before
/// the patch was applied.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the payload cannot be encoded.
pub fn interaction_updated(
    previous: &PartyInteraction,
    patch: &PartyInteractionPatch,
    updated_at: DateTime<Utc>,
    correlation_id: &str,
) -> Result<NewEvent, DomainError> {
    let payload = PartyInteractionUpdated {
        id: previous.id.clone(),
        changes: patch.changes(),
        previous_values: previous.snapshot_before(patch),
    };
    Ok(NewEvent::new(
        EventType::PartyInteractionUpdated,
        AggregateType::PartyInteraction,
        previous.id.clone(),
        UPDATED_EVENT_VERSION,
        to_payload(&payload)?,
    )
    .with_timestamp(updated_at)
    .with_correlation_id(correlation_id))
}

/// Builds the event announcing a deletion.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the payload cannot be encoded.
pub fn interaction_deleted(
    interaction_id: &str,
    deleted_at: DateTime<Utc>,
    correlation_id: &str,
) -> Result<NewEvent, DomainError> {
    let payload = PartyInteractionDeleted {
        id: interaction_id.to_owned(),
        deleted_at,
    };
    Ok(NewEvent::new(
        EventType::PartyInteractionDeleted,
        AggregateType::PartyInteraction,
        interaction_id,
        DELETED_EVENT_VERSION,
        to_payload(&payload)?,
    )
    .with_timestamp(deleted_at)
    .with_correlation_id(correlation_id))
}
