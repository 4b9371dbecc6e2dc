//! Command abstractions.

/// Trait that all commands implement.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// The type name for this command (for logging/routing).
    fn command_type(&self) -> &'static str;

    /// Correlation ID tracing this command through the events it causes.
    fn correlation_id(&self) -> &str;
}
