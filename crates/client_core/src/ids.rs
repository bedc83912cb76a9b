use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use shared::domain::TodoId;

/// Source of client-side ids for new todos.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> TodoId;

    /// Called with ids already present in the collection so later ids skip past them.
    fn observe(&self, _existing: TodoId) {}
}

/// Strictly increasing ids, seeded from the wall clock in milliseconds.
#[derive(Debug)]
pub struct MonotonicIds {
    next: AtomicI64,
}

impl MonotonicIds {
    pub fn starting_at(first: i64) -> Self {
        Self {
            next: AtomicI64::new(first),
        }
    }

    pub fn from_clock() -> Self {
        Self::starting_at(Utc::now().timestamp_millis())
    }
}

impl IdGenerator for MonotonicIds {
    fn next_id(&self) -> TodoId {
        TodoId(self.next.fetch_add(1, Ordering::Relaxed))
    }

    fn observe(&self, existing: TodoId) {
        self.next
            .fetch_max(existing.0.saturating_add(1), Ordering::Relaxed);
    }
}
