//! Progress computation for countdown timers.
//!
//! Pure functions over second counts. The timer engine and the
//! live-activity bridge both derive display values from here; nothing in
//! this module touches the clock or mutates state.

use serde::{Deserialize, Serialize};

/// Percentage of a timer's allocation that has elapsed, in `[0, 100]`.
///
/// The allocation is the original total plus any borrowed seconds. A zero
/// allocation reports 0. Remaining time beyond the allocation (a borrow
/// recorded after the fact) clamps to 0% rather than going negative.
pub fn completion_percentage(remaining_secs: u64, total_secs: u64, borrowed_secs: u64) -> f64 {
    let allocated = total_secs.saturating_add(borrowed_secs);
    if allocated == 0 {
        return 0.0;
    }
    let elapsed = allocated.saturating_sub(remaining_secs);
    (elapsed as f64 / allocated as f64 * 100.0).clamp(0.0, 100.0)
}

/// Three-way split of a completed timer's allocation, used to render the
/// original-used / borrowed-used / saved progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionSegments {
    /// Seconds consumed from the original allocation.
    pub original_used: u64,
    /// Seconds consumed beyond the original allocation (borrowed time).
    pub borrowed_used: u64,
    /// Seconds left over at forced completion.
    pub saved: u64,
}

impl CompletionSegments {
    /// Split `total + borrowed` into the three segments.
    ///
    /// The segments always sum to the allocation: consumed time fills the
    /// original budget first, spills into borrowed time, and whatever was
    /// not consumed is the saved segment.
    pub fn split(total_secs: u64, borrowed_secs: u64, saved_secs: u64) -> Self {
        let allocated = total_secs.saturating_add(borrowed_secs);
        let used = allocated.saturating_sub(saved_secs);
        let original_used = used.min(total_secs);
        let borrowed_used = used.saturating_sub(total_secs);
        CompletionSegments {
            original_used,
            borrowed_used,
            saved: allocated - original_used - borrowed_used,
        }
    }

    /// Total allocation the segments partition.
    pub fn allocated(&self) -> u64 {
        self.original_used + self.borrowed_used + self.saved
    }
}
