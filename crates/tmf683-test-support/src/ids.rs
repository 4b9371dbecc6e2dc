//! Test id generator: predictable `IdGenerator` implementation for tests.

use std::sync::atomic::{AtomicU64, Ordering};

use tmf683_core::id::IdGenerator;

/// Returns `"{prefix}-1"`, `"{prefix}-2"`, ... in call order.
#[derive(Debug)]
pub struct SequenceIdGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SequenceIdGenerator {
    /// Create a generator whose ids start at `{prefix}-1`.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl Default for SequenceIdGenerator {
    fn default() -> Self {
        Self::new("id")
    }
}

impl IdGenerator for SequenceIdGenerator {
    fn next_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        format!("{}-{n}", self.prefix)
    }
}
