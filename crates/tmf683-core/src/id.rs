//! Identifier generation abstraction.
//!
//! In production ids are random UUIDs. Tests inject a sequence so event and
//! aggregate ids are predictable.

use uuid::Uuid;

/// Supplies opaque unique identifiers for events and aggregates.
pub trait IdGenerator: Send + Sync {
    /// Returns a fresh identifier. Must be collision-resistant for the
    /// lifetime of the deployment.
    fn next_id(&self) -> String;
}

/// Generates random (v4) UUIDs rendered in hyphenated form.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
