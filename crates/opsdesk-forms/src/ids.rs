//! Identifier sources
//!
//! Every locally generated id (fallback file ids, checklist items) comes from an
//! injected [`IdGenerator`] so tests can pin the sequence.

use std::sync::atomic::{AtomicU64, Ordering};

/// Source of locally generated identifiers
pub trait IdGenerator: Send + Sync {
    /// Produce the next identifier
    fn next_id(&self) -> String;
}

/// Random v4 UUIDs
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Deterministic `prefix-N` identifiers, starting at 1
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    counter: AtomicU64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-{}", self.prefix, n)
    }
}
