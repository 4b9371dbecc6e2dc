//! Domain event model.
//!
//! A [`NewEvent`] is what an aggregate service hands to the bus: its `id` and
//! `timestamp` may still be unset. Publishing seals it into a [`DomainEvent`],
//! which is immutable from then on and shared behind an `Arc`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::error::DomainError;
use crate::id::IdGenerator;

/// The closed set of event types handlers may subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventType {
    /// A party interaction was created.
    #[serde(rename = "PartyInteractionCreatedEvent")]
    PartyInteractionCreated,
    /// A party interaction was updated.
    #[serde(rename = "PartyInteractionUpdatedEvent")]
    PartyInteractionUpdated,
    /// A party interaction was deleted.
    #[serde(rename = "PartyInteractionDeletedEvent")]
    PartyInteractionDeleted,
}

impl EventType {
    /// Every event type, in declaration order.
    pub const ALL: [Self; 3] = [
        Self::PartyInteractionCreated,
        Self::PartyInteractionUpdated,
        Self::PartyInteractionDeleted,
    ];

    /// Returns the wire tag for this event type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PartyInteractionCreated => "PartyInteractionCreatedEvent",
            Self::PartyInteractionUpdated => "PartyInteractionUpdatedEvent",
            Self::PartyInteractionDeleted => "PartyInteractionDeletedEvent",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|event_type| event_type.as_str() == s)
            .ok_or_else(|| DomainError::Validation(format!("unknown event type: {s}")))
    }
}

/// The kind of business entity an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregateType {
    /// A TMF683 party interaction.
    PartyInteraction,
}

impl AggregateType {
    /// Returns the wire tag for this aggregate type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PartyInteraction => "PartyInteraction",
        }
    }
}

impl fmt::Display for AggregateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable record of something that happened to an aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainEvent {
    /// Unique event identifier.
    pub id: String,
    /// Type tag used for handler routing.
    pub event_type: EventType,
    /// The aggregate this event concerns.
    pub aggregate_id: String,
    /// The kind of aggregate.
    pub aggregate_type: AggregateType,
    /// When the event was created.
    pub timestamp: DateTime<Utc>,
    /// Event schema version.
    pub version: i32,
    /// Event-specific data.
    pub payload: serde_json::Value,
    /// Request chain this event belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    /// The event that caused this one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub causation_id: Option<String>,
}

/// An event that has not been published yet.
///
/// `aggregate_type`, `aggregate_id`, `event_type`, `version` and `payload`
/// are required at construction; `id` and `timestamp` are filled in by
/// [`NewEvent::seal`] when left unset.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    /// Caller-chosen id, or `None` to generate one.
    pub id: Option<String>,
    /// Type tag used for handler routing.
    pub event_type: EventType,
    /// The aggregate this event concerns.
    pub aggregate_id: String,
    /// The kind of aggregate.
    pub aggregate_type: AggregateType,
    /// Caller-chosen timestamp, or `None` to use the publish time.
    pub timestamp: Option<DateTime<Utc>>,
    /// Event schema version.
    pub version: i32,
    /// Event-specific data.
    pub payload: serde_json::Value,
    /// Request chain this event belongs to.
    pub correlation_id: Option<String>,
    /// The event that caused this one.
    pub causation_id: Option<String>,
}

impl NewEvent {
    /// Creates an event with no id, timestamp, or tracing links.
    #[must_use]
    pub fn new(
        event_type: EventType,
        aggregate_type: AggregateType,
        aggregate_id: impl Into<String>,
        version: i32,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            id: None,
            event_type,
            aggregate_id: aggregate_id.into(),
            aggregate_type,
            timestamp: None,
            version,
            payload,
            correlation_id: None,
            causation_id: None,
        }
    }

    /// Sets an explicit event id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets an explicit creation timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Links the event to a request chain.
    #[must_use]
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Links the event to the event that caused it.
    #[must_use]
    pub fn with_causation_id(mut self, causation_id: impl Into<String>) -> Self {
        self.causation_id = Some(causation_id.into());
        self
    }

    /// Fills any missing `id` and `timestamp` and freezes the event.
    #[must_use]
    pub fn seal(self, clock: &dyn Clock, ids: &dyn IdGenerator) -> DomainEvent {
        DomainEvent {
            id: self.id.unwrap_or_else(|| ids.next_id()),
            event_type: self.event_type,
            aggregate_id: self.aggregate_id,
            aggregate_type: self.aggregate_type,
            timestamp: self.timestamp.unwrap_or_else(|| clock.now()),
            version: self.version,
            payload: self.payload,
            correlation_id: self.correlation_id,
            causation_id: self.causation_id,
        }
    }
}
