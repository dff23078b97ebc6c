//! # Timekeep Core Library
//!
//! This library provides the core logic for the Timekeep timer-and-task
//! tracker. It implements a CLI-first philosophy where all operations are
//! available via a standalone CLI binary, with any GUI shell being a thin
//! layer over the same core library.
//!
//! ## Architecture
//!
//! - **Timer**: A wall-clock-based countdown state machine that requires
//!   the caller to periodically invoke `tick()` for progress updates
//! - **Tasks & Stages**: Task records with subtask stages, per-date
//!   recurrence instances, and strict status transition tables
//! - **Progress**: Pure percentage and borrowed/saved accounting math
//! - **Storage**: SQLite-backed collections and TOML-based configuration
//! - **Bridge**: Live-activity payloads for platform notification sinks
//!
//! ## Key Components
//!
//! - [`Timer`]: Countdown timer state machine
//! - [`Task`]: Task with stages, recurrence, and streak bookkeeping
//! - [`Database`]: Collection and session-history persistence
//! - [`Config`]: Application configuration management

pub mod bridge;
pub mod category;
pub mod duration;
pub mod error;
pub mod events;
pub mod progress;
pub mod storage;
pub mod task;
pub mod timer;

pub use bridge::{ActivitySink, LiveActivityUpdate};
pub use category::Category;
pub use error::{ConfigError, CoreError, DatabaseError, DurationError, Result};
pub use events::Event;
pub use progress::{completion_percentage, CompletionSegments};
pub use storage::{Config, Database, Stats};
pub use task::{
    Comment, Priority, Recurrence, RecurrenceInstance, Stage, StageStatus, StageUpdateError,
    Streak, Task, TaskStatus, TaskTransitionError,
};
pub use timer::{BorrowEvent, Timer, TimerStatus, TransitionError};
