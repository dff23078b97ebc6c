//! Consecutive-completion streaks for recurring tasks.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Streak counter over a recurring task's scheduled dates.
///
/// Consecutive means "the previous scheduled occurrence was completed" --
/// a weekly task completed two weeks running has a streak of 2 even
/// though the calendar gap is seven days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    pub count: u32,
    #[serde(default)]
    pub last_date: Option<NaiveDate>,
}

impl Streak {
    /// Record a completion on `date`. `previous_occurrence` is the
    /// scheduled date immediately before `date`, if the recurrence has
    /// one; the streak continues only when that occurrence was the last
    /// completion.
    pub fn record(&mut self, date: NaiveDate, previous_occurrence: Option<NaiveDate>) {
        if self.last_date == Some(date) {
            return; // Already counted for this date.
        }
        if self.count > 0 && self.last_date.is_some() && self.last_date == previous_occurrence {
            self.count += 1;
        } else {
            self.count = 1;
        }
        self.last_date = Some(date);
    }

    /// Drop the streak back to zero.
    pub fn reset(&mut self) {
        self.count = 0;
        self.last_date = None;
    }
}
