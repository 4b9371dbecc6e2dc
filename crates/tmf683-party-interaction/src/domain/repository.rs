//! Party interaction persistence contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tmf683_core::error::DomainError;

use super::aggregates::{PartyInteraction, PartyInteractionPatch};

/// Result of an update: the record before and after the patch.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOutcome {
    /// The record as it was read before the patch.
    pub previous: PartyInteraction,
    /// The record as stored after the patch.
    pub current: PartyInteraction,
}

/// Storage for party interaction records.
#[async_trait]
pub trait PartyInteractionRepository: Send + Sync {
    /// Inserts a new record.
    async fn create(&self, interaction: &PartyInteraction) -> Result<(), DomainError>;

    /// Loads a record by id.
    async fn get(&self, id: &str) -> Result<Option<PartyInteraction>, DomainError>;

    /// Returns up to `limit` records after skipping `offset`, in creation
    /// order.
    async fn list(&self, offset: u32, limit: u32) -> Result<Vec<PartyInteraction>, DomainError>;

    /// Reads the current record and applies `patch` as one atomic step, so
    /// the returned `previous` is exactly what the patch replaced. Returns
    /// `None` if no record has that id.
    async fn update(
        &self,
        id: &str,
        patch: &PartyInteractionPatch,
        updated_by: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<UpdateOutcome>, DomainError>;

    /// Deletes a record. Returns `false` if no record had that id.
    async fn delete(&self, id: &str) -> Result<bool, DomainError>;
}
