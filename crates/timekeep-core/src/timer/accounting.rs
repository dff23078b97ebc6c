//! Borrowed-time audit trail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One borrow action. The timer's `borrow_log` is append-only; entries
/// are never edited or removed once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowEvent {
    /// Seconds added to the allocation.
    pub seconds: u64,
    /// When the borrow happened.
    pub at: DateTime<Utc>,
}

impl BorrowEvent {
    pub fn new(seconds: u64, at: DateTime<Utc>) -> Self {
        BorrowEvent { seconds, at }
    }
}
