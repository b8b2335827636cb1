use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};

/// Millisecond-timestamp ids that never repeat within a process.
///
/// Each id is `max(now_millis, previous + 1)`, so two records created in the
/// same millisecond still get distinct, increasing ids.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicI64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let previous = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(now.max(last + 1)))
            .unwrap_or_else(|last| last);
        now.max(previous + 1)
    }

    /// Never hand out an id at or below `id` (e.g. ids already on disk)
    pub fn observe(&self, id: i64) {
        self.last.fetch_max(id, Ordering::SeqCst);
    }
}
