//! Task stages: sub-intervals of a task with their own mini-timeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::duration::format_clock_hhmm;

/// Stage status enumeration.
///
/// Strict transitions:
///
/// ```text
/// Upcoming -> Process -> Done
///                |  ^
///                v  |
///              Undone
/// ```
///
/// `Done` is terminal; an `Undone` stage can be retried. Free-form
/// corrections bypass the table through [`Stage::force_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageStatus {
    Upcoming,
    Process,
    Done,
    Undone,
}

impl StageStatus {
    /// Check if a transition is valid.
    pub fn can_transition_to(&self, to: &StageStatus) -> bool {
        match self {
            StageStatus::Upcoming => matches!(to, StageStatus::Process),
            StageStatus::Process => matches!(to, StageStatus::Done | StageStatus::Undone),
            StageStatus::Undone => matches!(to, StageStatus::Process),
            StageStatus::Done => false,
        }
    }

    /// Get valid next statuses for this status.
    pub fn valid_transitions(&self) -> &[StageStatus] {
        match self {
            StageStatus::Upcoming => &[StageStatus::Process],
            StageStatus::Process => &[StageStatus::Done, StageStatus::Undone],
            StageStatus::Undone => &[StageStatus::Process],
            StageStatus::Done => &[],
        }
    }
}

impl Default for StageStatus {
    fn default() -> Self {
        StageStatus::Upcoming
    }
}

/// Error returned when an invalid stage transition is attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageTransitionError {
    pub from: StageStatus,
    pub to: StageStatus,
}

impl std::fmt::Display for StageTransitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid stage transition: {:?} -> {:?}",
            self.from, self.to
        )
    }
}

impl std::error::Error for StageTransitionError {}

/// A sub-interval of a task with its own start time, duration, and status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub id: String,
    pub text: String,
    pub status: StageStatus,
    /// Minutes after midnight when the stage is scheduled to begin.
    pub start_time_minutes: u32,
    pub duration_minutes: u32,
    /// Wall-clock stamp of the transition into `Process`.
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    /// Wall-clock stamp of the transition into `Done` or `Undone`.
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
    /// Legacy mirror of `status == Done`. Every status write keeps this
    /// in lockstep; readers predating the status enum still consume it.
    #[serde(default)]
    pub completed: bool,
}

impl Stage {
    pub fn new(text: impl Into<String>, start_time_minutes: u32, duration_minutes: u32) -> Self {
        Stage {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            status: StageStatus::Upcoming,
            start_time_minutes,
            duration_minutes,
            started_at: None,
            ended_at: None,
            completed: false,
        }
    }

    /// Scheduled end, derived -- never stored.
    pub fn end_time_minutes(&self) -> u32 {
        self.start_time_minutes + self.duration_minutes
    }

    /// Scheduled window as wall-clock strings; ends past midnight wrap.
    pub fn scheduled_window(&self) -> (String, String) {
        (
            format_clock_hhmm(self.start_time_minutes),
            format_clock_hhmm(self.end_time_minutes()),
        )
    }

    /// Transition through the strict table.
    ///
    /// Returns an error and leaves the stage untouched if the transition
    /// is not allowed.
    pub fn transition(&mut self, to: StageStatus) -> Result<(), StageTransitionError> {
        if !self.status.can_transition_to(&to) {
            return Err(StageTransitionError {
                from: self.status,
                to,
            });
        }
        self.apply(to, Utc::now());
        Ok(())
    }

    /// Set any status regardless of the table. The correction popup maps
    /// here; the `completed` mirror is still maintained.
    pub fn force_status(&mut self, to: StageStatus) {
        self.apply(to, Utc::now());
    }

    /// Reset to a fresh `Upcoming` stage, keeping the schedule.
    pub fn reset(&mut self) {
        self.status = StageStatus::Upcoming;
        self.started_at = None;
        self.ended_at = None;
        self.completed = false;
    }

    fn apply(&mut self, to: StageStatus, now: DateTime<Utc>) {
        match to {
            StageStatus::Process => {
                self.started_at = Some(now);
                self.ended_at = None;
            }
            StageStatus::Done | StageStatus::Undone => {
                self.ended_at = Some(now);
            }
            StageStatus::Upcoming => {
                self.started_at = None;
                self.ended_at = None;
            }
        }
        self.status = to;
        self.completed = to == StageStatus::Done;
    }
}
