//! In-memory stores for running the service without a database.
//!
//! Contents are lost on restart.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use tmf683_core::error::DomainError;
use tmf683_core::event_log::{EventLogRecord, EventLogStore};
use tmf683_party_interaction::domain::aggregates::{PartyInteraction, PartyInteractionPatch};
use tmf683_party_interaction::domain::repository::{PartyInteractionRepository, UpdateOutcome};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Event log held in a vector, in append order.
#[derive(Debug, Default)]
pub struct InMemoryEventLog {
    records: Mutex<Vec<EventLogRecord>>,
}

impl InMemoryEventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventLogStore for InMemoryEventLog {
    async fn append(&self, record: &EventLogRecord) -> Result<(), DomainError> {
        let mut records = lock(&self.records);
        if records.iter().any(|existing| existing.id == record.id) {
            return Err(DomainError::Infrastructure(format!(
                "duplicate event log id: {}",
                record.id
            )));
        }
        records.push(record.clone());
        Ok(())
    }

    async fn list_unprocessed(&self) -> Result<Vec<EventLogRecord>, DomainError> {
        Ok(lock(&self.records)
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
        let mut records = lock(&self.records);
        let Some(record) = records.iter_mut().find(|record| record.id == event_id) else {
            return Ok(false);
        };
        record.processed = true;
        record.processed_at = Some(processed_at);
        Ok(true)
    }
}

/// Party interaction repository held in a vector, in creation order.
#[derive(Debug, Default)]
pub struct InMemoryPartyInteractionRepository {
    interactions: Mutex<Vec<PartyInteraction>>,
}

impl InMemoryPartyInteractionRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PartyInteractionRepository for InMemoryPartyInteractionRepository {
    async fn create(&self, interaction: &PartyInteraction) -> Result<(), DomainError> {
        let mut interactions = lock(&self.interactions);
        if interactions.iter().any(|existing| existing.id == interaction.id) {
            return Err(DomainError::Infrastructure(format!(
                "duplicate party interaction id: {}",
                interaction.id
            )));
        }
        interactions.push(interaction.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<PartyInteraction>, DomainError> {
        Ok(lock(&self.interactions)
            .iter()
            .find(|interaction| interaction.id == id)
            .cloned())
    }

    async fn list(&self, offset: u32, limit: u32) -> Result<Vec<PartyInteraction>, DomainError> {
        let skip = usize::try_from(offset).unwrap_or(usize::MAX);
        let take = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(lock(&self.interactions)
            .iter()
            .skip(skip)
            .take(take)
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        id: &str,
        patch: &PartyInteractionPatch,
        updated_by: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<UpdateOutcome>, DomainError> {
        let mut interactions = lock(&self.interactions);
        let Some(stored) = interactions.iter_mut().find(|interaction| interaction.id == id) else {
            return Ok(None);
        };
        let previous = stored.clone();
        stored.apply_patch(patch, updated_by, updated_at);
        Ok(Some(UpdateOutcome {
            previous,
            current: stored.clone(),
        }))
    }

    async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        let mut interactions = lock(&self.interactions);
        let before = interactions.len();
        interactions.retain(|interaction| interaction.id != id);
        Ok(interactions.len() < before)
    }
}
