//! `PostgreSQL` implementation of the `EventLogStore` trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use tmf683_core::error::DomainError;
use tmf683_core::event_log::{EventLogRecord, EventLogStore};

use crate::infrastructure;

/// PostgreSQL-backed event log over the `event_logs` table.
#[derive(Debug, Clone)]
pub struct PgEventLog {
    pool: PgPool,
}

impl PgEventLog {
    /// Creates a new `PgEventLog`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct EventLogRow {
    id: String,
    event_type: String,
    aggregate_id: String,
    aggregate_type: String,
    payload: serde_json::Value,
    version: i32,
    occurred_at: DateTime<Utc>,
    correlation_id: Option<String>,
    causation_id: Option<String>,
    processed: bool,
    processed_at: Option<DateTime<Utc>>,
}

impl From<EventLogRow> for EventLogRecord {
    fn from(row: EventLogRow) -> Self {
        Self {
            id: row.id,
            event_type: row.event_type,
            aggregate_id: row.aggregate_id,
            aggregate_type: row.aggregate_type,
            payload: row.payload,
            version: row.version,
            timestamp: row.occurred_at,
            correlation_id: row.correlation_id,
            causation_id: row.causation_id,
            processed: row.processed,
            processed_at: row.processed_at,
        }
    }
}

#[async_trait]
impl EventLogStore for PgEventLog {
    async fn append(&self, record: &EventLogRecord) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO event_logs \
             (id, event_type, aggregate_id, aggregate_type, payload, version, occurred_at, \
              correlation_id, causation_id, processed, processed_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(&record.id)
        .bind(&record.event_type)
        .bind(&record.aggregate_id)
        .bind(&record.aggregate_type)
        .bind(&record.payload)
        .bind(record.version)
        .bind(record.timestamp)
        .bind(&record.correlation_id)
        .bind(&record.causation_id)
        .bind(record.processed)
        .bind(record.processed_at)
        .execute(&self.pool)
        .await
        .map_err(infrastructure)?;

        Ok(())
    }

    async fn list_unprocessed(&self) -> Result<Vec<EventLogRecord>, DomainError> {
        let rows: Vec<EventLogRow> = sqlx::query_as(
            "SELECT id, event_type, aggregate_id, aggregate_type, payload, version, occurred_at, \
                    correlation_id, causation_id, processed, processed_at \
             FROM event_logs \
             WHERE NOT processed \
             ORDER BY occurred_at, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(infrastructure)?;

        Ok(rows.into_iter().map(EventLogRecord::from).collect())
    }

    async fn mark_processed(
        &self,
        event_id: &str,
        processed_at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "UPDATE event_logs SET processed = TRUE, processed_at = $2 WHERE id = $1",
        )
        .bind(event_id)
        .bind(processed_at)
        .execute(&self.pool)
        .await
        .map_err(infrastructure)?;

        Ok(result.rows_affected() > 0)
    }
}
