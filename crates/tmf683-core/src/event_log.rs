//! Durable event log abstraction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::DomainError;
use crate::event::DomainEvent;

/// Stored representation of a published event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventLogRecord {
    /// Unique event identifier.
    pub id: String,
    /// Event type tag.
    pub event_type: String,
    /// Aggregate this event belongs to.
    pub aggregate_id: String,
    /// Aggregate type tag.
    pub aggregate_type: String,
    /// Serialized event payload.
    pub payload: serde_json::Value,
    /// Event schema version.
    pub version: i32,
    /// Timestamp of event creation.
    pub timestamp: DateTime<Utc>,
    /// Correlation ID for tracing.
    pub correlation_id: Option<String>,
    /// Causation ID linking to the causing event.
    pub causation_id: Option<String>,
    /// `false` while pending downstream processing.
    pub processed: bool,
    /// When the record was marked processed.
    pub processed_at: Option<DateTime<Utc>>,
}

impl From<&DomainEvent> for EventLogRecord {
    fn from(event: &DomainEvent) -> Self {
        Self {
            id: event.id.clone(),
            event_type: event.event_type.as_str().to_owned(),
            aggregate_id: event.aggregate_id.clone(),
            aggregate_type: event.aggregate_type.as_str().to_owned(),
            payload: event.payload.clone(),
            version: event.version,
            timestamp: event.timestamp,
            correlation_id: event.correlation_id.clone(),
            causation_id: event.causation_id.clone(),
            processed: false,
            processed_at: None,
        }
    }
}

/// Append-only store of every published event, keyed by event id.
#[async_trait]
pub trait EventLogStore: Send + Sync {
    /// Durably inserts one record.
    async fn append(&self, record: &EventLogRecord) -> Result<(), DomainError>;

    /// Returns all records still pending processing, oldest first.
    async fn list_unprocessed(&self) -> Result<Vec<EventLogRecord>, DomainError>;

    /// Marks a record processed. Returns `false` if no record has that id.
    async fn mark_processed(
        &self,
        event_id: &str,
        processed_at: DateTime<Utc>,
    ) -> Result<bool, DomainError>;
}
