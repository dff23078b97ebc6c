//! Countdown timer state machine.
//!
//! A [`Timer`] is a wall-clock-based countdown. It does not use internal
//! threads - the caller is responsible for calling `tick()` periodically.
//!
//! ## Status Transitions
//!
//! ```text
//! Upcoming -> Running <-> Paused
//!                |           |
//!                +-> Completed <-+
//! ```
//!
//! `Completed` is terminal for timing purposes, with two carve-outs: the
//! one-shot acknowledgement flag, and revival through `borrow()` which
//! extends the session and puts the timer back into `Running`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::accounting::BorrowEvent;
use crate::duration::{format_hms, hms_string};
use crate::events::Event;
use crate::progress::{completion_percentage, CompletionSegments};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Upcoming,
    Running,
    Paused,
    Completed,
}

impl TimerStatus {
    /// Check if a transition is valid.
    pub fn can_transition_to(&self, to: &TimerStatus) -> bool {
        match self {
            TimerStatus::Upcoming => matches!(to, TimerStatus::Running),
            TimerStatus::Running => matches!(to, TimerStatus::Paused | TimerStatus::Completed),
            TimerStatus::Paused => matches!(to, TimerStatus::Running | TimerStatus::Completed),
            TimerStatus::Completed => false, // Terminal; revival goes through borrow().
        }
    }

    /// Get valid next statuses for this status.
    pub fn valid_transitions(&self) -> &[TimerStatus] {
        match self {
            TimerStatus::Upcoming => &[TimerStatus::Running],
            TimerStatus::Running => &[TimerStatus::Paused, TimerStatus::Completed],
            TimerStatus::Paused => &[TimerStatus::Running, TimerStatus::Completed],
            TimerStatus::Completed => &[],
        }
    }

    /// Lowercase wire label, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerStatus::Upcoming => "upcoming",
            TimerStatus::Running => "running",
            TimerStatus::Paused => "paused",
            TimerStatus::Completed => "completed",
        }
    }
}

/// Error returned when a command is rejected. The timer is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("invalid transition: {from:?} -> {to:?}")]
    InvalidTransition { from: TimerStatus, to: TimerStatus },

    #[error("borrowing is not allowed while {status:?}")]
    BorrowNotAllowed { status: TimerStatus },

    #[error("only a completed timer can be acknowledged")]
    NotCompleted,

    #[error("timer is already acknowledged")]
    AlreadyAcknowledged,
}

/// A countdown timer.
///
/// Operates on wall-clock deltas -- `started_at` and `remaining_at_start`
/// are snapshotted on every start/resume, and `tick()` derives the current
/// remaining time from them. The caller drives ticks; nothing here spawns
/// threads or sleeps.
///
/// Duration fields serialize in the legacy `"HH:MM:SS"` wire form (`time`
/// and `total`), while the in-memory representation is integer seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timer {
    pub id: String,
    pub title: String,
    /// Remaining seconds. Decreases only while running; increases only
    /// through explicit borrows.
    #[serde(rename = "time", with = "hms_string")]
    pub remaining_secs: u64,
    /// Original allocation in seconds. Immutable once created.
    #[serde(rename = "total", with = "hms_string")]
    pub total_secs: u64,
    pub status: TimerStatus,
    /// Seconds borrowed during the session; monotonically non-decreasing.
    #[serde(default)]
    pub borrowed_secs: u64,
    /// Append-only audit trail of borrow actions.
    #[serde(default)]
    pub borrow_log: Vec<BorrowEvent>,
    /// Leftover seconds recorded at forced completion.
    #[serde(default)]
    pub saved_secs: u64,
    #[serde(default)]
    pub for_date: Option<NaiveDate>,
    #[serde(default)]
    pub category_id: Option<String>,
    /// Wall-clock instant of the last start/resume. `None` unless running.
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    /// Remaining-seconds snapshot taken at the last start/resume.
    #[serde(default)]
    pub remaining_at_start: Option<u64>,
    #[serde(default)]
    pub paused_at: Option<DateTime<Utc>>,
    /// One-shot completion flag; flips false -> true exactly once per
    /// completion and drives the notification sound.
    #[serde(default)]
    pub acknowledged: bool,
}

impl Timer {
    /// Create a new timer in the `Upcoming` status with a full countdown.
    pub fn new(title: impl Into<String>, total_secs: u64) -> Self {
        Timer {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            remaining_secs: total_secs,
            total_secs,
            status: TimerStatus::Upcoming,
            borrowed_secs: 0,
            borrow_log: Vec::new(),
            saved_secs: 0,
            for_date: None,
            category_id: None,
            started_at: None,
            remaining_at_start: None,
            paused_at: None,
            acknowledged: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Total seconds allocated: the original total plus borrows.
    pub fn allocated_secs(&self) -> u64 {
        self.total_secs.saturating_add(self.borrowed_secs)
    }

    /// Percentage of the allocation elapsed, in `[0, 100]`.
    pub fn progress_pct(&self) -> f64 {
        completion_percentage(self.remaining_secs, self.total_secs, self.borrowed_secs)
    }

    /// Original-used / borrowed-used / saved split for the progress bar.
    pub fn segments(&self) -> CompletionSegments {
        CompletionSegments::split(self.total_secs, self.borrowed_secs, self.saved_secs)
    }

    /// Remaining time formatted as `HH:MM:SS`.
    pub fn remaining_display(&self) -> String {
        format_hms(self.remaining_secs)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            timer_id: self.id.clone(),
            status: self.status,
            remaining_secs: self.remaining_secs,
            total_secs: self.total_secs,
            borrowed_secs: self.borrowed_secs,
            saved_secs: self.saved_secs,
            progress_pct: self.progress_pct(),
            acknowledged: self.acknowledged,
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Result<Event, TransitionError> {
        self.start_at(Utc::now())
    }

    pub fn start_at(&mut self, now: DateTime<Utc>) -> Result<Event, TransitionError> {
        if self.status != TimerStatus::Upcoming {
            return Err(TransitionError::InvalidTransition {
                from: self.status,
                to: TimerStatus::Running,
            });
        }
        self.status = TimerStatus::Running;
        self.started_at = Some(now);
        self.remaining_at_start = Some(self.remaining_secs);
        self.paused_at = None;
        Ok(Event::TimerStarted {
            timer_id: self.id.clone(),
            title: self.title.clone(),
            total_secs: self.total_secs,
            at: now,
        })
    }

    pub fn pause(&mut self) -> Result<Event, TransitionError> {
        self.pause_at(Utc::now())
    }

    pub fn pause_at(&mut self, now: DateTime<Utc>) -> Result<Event, TransitionError> {
        if self.status != TimerStatus::Running {
            return Err(TransitionError::InvalidTransition {
                from: self.status,
                to: TimerStatus::Paused,
            });
        }
        self.sync_remaining(now);
        self.status = TimerStatus::Paused;
        self.started_at = None;
        self.remaining_at_start = None;
        self.paused_at = Some(now);
        Ok(Event::TimerPaused {
            timer_id: self.id.clone(),
            remaining_secs: self.remaining_secs,
            at: now,
        })
    }

    pub fn resume(&mut self) -> Result<Event, TransitionError> {
        self.resume_at(Utc::now())
    }

    pub fn resume_at(&mut self, now: DateTime<Utc>) -> Result<Event, TransitionError> {
        if self.status != TimerStatus::Paused {
            return Err(TransitionError::InvalidTransition {
                from: self.status,
                to: TimerStatus::Running,
            });
        }
        self.status = TimerStatus::Running;
        self.started_at = Some(now);
        self.remaining_at_start = Some(self.remaining_secs);
        self.paused_at = None;
        Ok(Event::TimerResumed {
            timer_id: self.id.clone(),
            remaining_secs: self.remaining_secs,
            at: now,
        })
    }

    /// Complete the timer before its countdown expires.
    ///
    /// Leftover seconds are recorded as saved time for the three-segment
    /// progress bar.
    pub fn complete(&mut self) -> Result<Event, TransitionError> {
        self.complete_at(Utc::now())
    }

    pub fn complete_at(&mut self, now: DateTime<Utc>) -> Result<Event, TransitionError> {
        match self.status {
            TimerStatus::Running => self.sync_remaining(now),
            TimerStatus::Paused => {}
            _ => {
                return Err(TransitionError::InvalidTransition {
                    from: self.status,
                    to: TimerStatus::Completed,
                })
            }
        }
        let saved = self.remaining_secs;
        self.saved_secs = saved;
        self.remaining_secs = 0;
        self.finish();
        Ok(Event::TimerCompleted {
            timer_id: self.id.clone(),
            forced: saved > 0,
            saved_secs: saved,
            at: now,
        })
    }

    /// Call periodically while the timer is running. Returns
    /// `Some(Event::TimerCompleted)` when the countdown reaches zero.
    pub fn tick(&mut self) -> Option<Event> {
        self.tick_at(Utc::now())
    }

    pub fn tick_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if self.status != TimerStatus::Running {
            return None;
        }
        self.sync_remaining(now);
        if self.remaining_secs == 0 {
            // Natural expiry leaves no saved time.
            self.finish();
            return Some(Event::TimerCompleted {
                timer_id: self.id.clone(),
                forced: false,
                saved_secs: 0,
                at: now,
            });
        }
        None
    }

    /// Add seconds to the allocation.
    ///
    /// Legal while `Running`, `Paused`, or `Completed`. Borrowing on a
    /// completed timer revives it: the borrowed seconds become the new
    /// remaining time, saved time is cleared, and acknowledgement is
    /// re-armed so the next completion notifies again.
    pub fn borrow(&mut self, seconds: u64) -> Result<Event, TransitionError> {
        self.borrow_at(seconds, Utc::now())
    }

    pub fn borrow_at(
        &mut self,
        seconds: u64,
        now: DateTime<Utc>,
    ) -> Result<Event, TransitionError> {
        let revived = match self.status {
            TimerStatus::Running => {
                self.sync_remaining(now);
                self.remaining_secs = self.remaining_secs.saturating_add(seconds);
                // Re-snapshot so the next tick counts from the new total.
                self.started_at = Some(now);
                self.remaining_at_start = Some(self.remaining_secs);
                false
            }
            TimerStatus::Paused => {
                self.remaining_secs = self.remaining_secs.saturating_add(seconds);
                false
            }
            TimerStatus::Completed => {
                self.status = TimerStatus::Running;
                self.remaining_secs = seconds;
                self.saved_secs = 0;
                self.acknowledged = false;
                self.started_at = Some(now);
                self.remaining_at_start = Some(seconds);
                self.paused_at = None;
                true
            }
            TimerStatus::Upcoming => {
                return Err(TransitionError::BorrowNotAllowed {
                    status: self.status,
                })
            }
        };
        self.borrowed_secs = self.borrowed_secs.saturating_add(seconds);
        self.borrow_log.push(BorrowEvent::new(seconds, now));
        Ok(Event::TimeBorrowed {
            timer_id: self.id.clone(),
            seconds,
            borrowed_total_secs: self.borrowed_secs,
            revived,
            at: now,
        })
    }

    /// Flip the one-shot acknowledgement flag.
    pub fn acknowledge(&mut self) -> Result<Event, TransitionError> {
        self.acknowledge_at(Utc::now())
    }

    pub fn acknowledge_at(&mut self, now: DateTime<Utc>) -> Result<Event, TransitionError> {
        if self.status != TimerStatus::Completed {
            return Err(TransitionError::NotCompleted);
        }
        if self.acknowledged {
            return Err(TransitionError::AlreadyAcknowledged);
        }
        self.acknowledged = true;
        Ok(Event::TimerAcknowledged {
            timer_id: self.id.clone(),
            at: now,
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Derive the current remaining time from the start snapshot.
    fn sync_remaining(&mut self, now: DateTime<Utc>) {
        if let (Some(started), Some(snapshot)) = (self.started_at, self.remaining_at_start) {
            let elapsed = (now - started).num_seconds().max(0) as u64;
            self.remaining_secs = snapshot.saturating_sub(elapsed);
        }
    }

    fn finish(&mut self) {
        self.status = TimerStatus::Completed;
        self.started_at = None;
        self.remaining_at_start = None;
        self.paused_at = None;
    }
}
