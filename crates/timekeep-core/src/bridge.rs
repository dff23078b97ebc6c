//! Live-activity bridge payloads.
//!
//! The engine never talks to a platform notification service directly.
//! It produces [`LiveActivityUpdate`] payloads; sinks implementing
//! [`ActivitySink`] push them wherever they need to go, fire-and-forget.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::Timer;

/// Snapshot consumed by the platform live-activity/notification surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveActivityUpdate {
    pub id: String,
    pub title: String,
    /// Projected completion instant, unix seconds.
    pub end_time: i64,
    /// Percent complete, 0-100.
    pub progress: f64,
    /// Lowercase status label ("upcoming", "running", ...).
    pub status: String,
}

impl LiveActivityUpdate {
    /// Derive the payload for a timer as of `now`.
    pub fn for_timer(timer: &Timer, now: DateTime<Utc>) -> Self {
        LiveActivityUpdate {
            id: timer.id.clone(),
            title: timer.title.clone(),
            end_time: now.timestamp() + timer.remaining_secs as i64,
            progress: timer.progress_pct(),
            status: timer.status.as_str().to_string(),
        }
    }
}

/// Destination for live-activity pushes.
///
/// Sinks are stateless between calls and must not block the caller on
/// failure; a push that cannot be delivered is dropped.
pub trait ActivitySink: Send + Sync {
    /// Unique identifier (e.g. "live_activity", "widget").
    fn name(&self) -> &str;

    /// Called on every timer state change.
    fn on_update(&self, _update: &LiveActivityUpdate) -> Result<(), Box<dyn std::error::Error>> {
        Ok(()) // default no-op
    }

    /// Called when a timer's session ends for good.
    fn on_ended(&self, _timer_id: &str) -> Result<(), Box<dyn std::error::Error>> {
        Ok(()) // default no-op
    }
}
