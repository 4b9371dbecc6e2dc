//! Test event logs: mock `EventLogStore` implementations for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tmf683_core::error::DomainError;
use tmf683_core::event_log::{EventLogRecord, EventLogStore};

/// An event log that keeps every appended record in memory and always
/// succeeds.
#[derive(Debug, Default)]
pub struct RecordingEventLog {
    records: Mutex<Vec<EventLogRecord>>,
}

impl RecordingEventLog {
    /// Create an empty recording log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all records appended so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn appended(&self) -> Vec<EventLogRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventLogStore for RecordingEventLog {
    async fn append(&self, record: &EventLogRecord) -> Result<(), DomainError> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn list_unprocessed(&self) -> Result<Vec<EventLogRecord>, DomainError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|record| !record.processed)
            .cloned()
            .collect())
    }

    async fn mark_processed(
        &self,
        event_id: &str,
        processed_at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let mut records = self.records.lock().unwrap();
        match records.iter_mut().find(|record| record.id == event_id) {
            Some(record) => {
                record.processed = true;
                record.processed_at = Some(processed_at);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// An event log that always returns an infrastructure error. Useful for
/// testing that persistence failures are swallowed.
#[derive(Debug)]
pub struct FailingEventLog;

#[async_trait]
impl EventLogStore for FailingEventLog {
    async fn append(&self, _record: &EventLogRecord) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn list_unprocessed(&self) -> Result<Vec<EventLogRecord>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn mark_processed(
        &self,
        _event_id: &str,
        _processed_at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}
