use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::{StageStatus, TaskStatus};
use crate::timer::TimerStatus;

/// Every state change in the engine produces an Event.
/// The CLI prints them; activity sinks subscribe to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        timer_id: String,
        title: String,
        total_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        timer_id: String,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        timer_id: String,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// Countdown finished, either naturally or by forced completion.
    /// `saved_secs` is non-zero only for forced completions.
    TimerCompleted {
        timer_id: String,
        forced: bool,
        saved_secs: u64,
        at: DateTime<Utc>,
    },
    /// Seconds added to the allocation. `revived` is set when the borrow
    /// pulled a completed timer back into the running state.
    TimeBorrowed {
        timer_id: String,
        seconds: u64,
        borrowed_total_secs: u64,
        revived: bool,
        at: DateTime<Utc>,
    },
    /// One-shot completion acknowledgement (drives the notification sound).
    TimerAcknowledged {
        timer_id: String,
        at: DateTime<Utc>,
    },
    TaskStatusChanged {
        task_id: String,
        from: TaskStatus,
        to: TaskStatus,
        at: DateTime<Utc>,
    },
    StageStatusChanged {
        task_id: String,
        stage_id: String,
        from: StageStatus,
        to: StageStatus,
        /// Set when the change bypassed the transition table.
        forced: bool,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        timer_id: String,
        status: TimerStatus,
        remaining_secs: u64,
        total_secs: u64,
        borrowed_secs: u64,
        saved_secs: u64,
        progress_pct: f64,
        acknowledged: bool,
        at: DateTime<Utc>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_internally_tagged() {
        let event = Event::TimerAcknowledged {
            timer_id: "t-1".into(),
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "TimerAcknowledged");
        assert_eq!(json["timer_id"], "t-1");
    }

    #[test]
    fn snapshot_round_trips() {
        let event = Event::StateSnapshot {
            timer_id: "t-1".into(),
            status: TimerStatus::Running,
            remaining_secs: 90,
            total_secs: 300,
            borrowed_secs: 0,
            saved_secs: 0,
            progress_pct: 70.0,
            acknowledged: false,
            at: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap();
        let _decoded: Event = serde_json::from_str(&json).unwrap();
    }
}
