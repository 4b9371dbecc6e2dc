//! Persistence for the TMF683 Party Interaction service.
//!
//! PostgreSQL implementations back production; the in-memory ones let the
//! service run without a database during development.

pub mod memory;
pub mod pg_event_log;
pub mod pg_party_interaction_repository;

pub use memory::{InMemoryEventLog, InMemoryPartyInteractionRepository};
pub use pg_event_log::PgEventLog;
pub use pg_party_interaction_repository::PgPartyInteractionRepository;

use tmf683_core::error::DomainError;

pub(crate) fn infrastructure(err: sqlx::Error) -> DomainError {
    DomainError::Infrastructure(err.to_string())
}
