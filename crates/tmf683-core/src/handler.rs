//! Event handler abstraction.

use async_trait::async_trait;

use crate::error::DomainError;
use crate::event::DomainEvent;

/// A side-effecting listener invoked by the event bus.
///
/// Errors are logged by the bus and never reach the publisher.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Reacts to one published event.
    async fn handle(&self, event: &DomainEvent) -> Result<(), DomainError>;
}
