//! Tasks with subtask stages and recurrence.
//!
//! A task is either one-off or recurring. Recurring tasks keep per-date
//! override data (stages, status) in `recurrence_instances`, keyed by the
//! occurrence date; comments are shared across all instances.

pub mod stage;
mod streak;

pub use stage::{Stage, StageStatus, StageTransitionError};
pub use streak::Streak;

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::events::Event;

/// Task status enumeration.
///
/// Valid transitions:
/// - Pending -> In Progress | Completed
/// - In Progress -> Pending | Completed
/// - Completed is terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl TaskStatus {
    /// Check if a transition is valid.
    pub fn can_transition_to(&self, to: &TaskStatus) -> bool {
        match self {
            TaskStatus::Pending => {
                matches!(to, TaskStatus::InProgress | TaskStatus::Completed)
            }
            TaskStatus::InProgress => {
                matches!(to, TaskStatus::Pending | TaskStatus::Completed)
            }
            TaskStatus::Completed => false, // Terminal state
        }
    }

    /// Get valid next statuses for this status.
    pub fn valid_transitions(&self) -> &[TaskStatus] {
        match self {
            TaskStatus::Pending => &[TaskStatus::InProgress, TaskStatus::Completed],
            TaskStatus::InProgress => &[TaskStatus::Pending, TaskStatus::Completed],
            TaskStatus::Completed => &[],
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Pending
    }
}

/// Error returned when an invalid task transition is attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskTransitionError {
    pub from: TaskStatus,
    pub to: TaskStatus,
}

impl std::fmt::Display for TaskTransitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid task transition: {:?} -> {:?}",
            self.from, self.to
        )
    }
}

impl std::error::Error for TaskTransitionError {}

/// Error returned when a stage update cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageUpdateError {
    #[error("stage not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Transition(#[from] StageTransitionError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

/// Recurrence rule for repeating tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    Daily,
    Weekdays,
    /// Weekly on a fixed day; 0 = Sun ... 6 = Sat.
    Weekly {
        weekday: u8,
    },
}

impl Recurrence {
    /// Whether the task is scheduled on `date`.
    pub fn occurs_on(&self, date: NaiveDate) -> bool {
        match self {
            Recurrence::Daily => true,
            Recurrence::Weekdays => !matches!(date.weekday(), Weekday::Sat | Weekday::Sun),
            Recurrence::Weekly { weekday } => {
                date.weekday().num_days_from_sunday() == u32::from(*weekday)
            }
        }
    }

    /// The scheduled occurrence immediately before `date`.
    pub fn previous_occurrence(&self, date: NaiveDate) -> Option<NaiveDate> {
        let mut cursor = date.pred_opt()?;
        for _ in 0..7 {
            if self.occurs_on(cursor) {
                return Some(cursor);
            }
            cursor = cursor.pred_opt()?;
        }
        None
    }
}

/// A comment on a task. Shared across all recurrence instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(text: impl Into<String>) -> Self {
        Comment {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}

/// Per-date override data for a recurring task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecurrenceInstance {
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub stages: Vec<Stage>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

/// A task with optional subtask stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub for_date: Option<NaiveDate>,
    #[serde(default)]
    pub backlog: bool,
    #[serde(default)]
    pub recurrence: Option<Recurrence>,
    /// Per-date override data for recurring tasks, keyed by occurrence
    /// date. Instances materialize lazily from the stage template.
    #[serde(default)]
    pub recurrence_instances: BTreeMap<NaiveDate, RecurrenceInstance>,
    /// Stage template. One-off tasks use this directly; recurring tasks
    /// clone it into each instance.
    #[serde(default)]
    pub stages: Vec<Stage>,
    /// Shared across all recurrence instances.
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub streak: Streak,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Create a new pending task.
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Task {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            status: TaskStatus::Pending,
            priority: Priority::default(),
            for_date: None,
            backlog: false,
            recurrence: None,
            recurrence_instances: BTreeMap::new(),
            stages: Vec::new(),
            comments: Vec::new(),
            streak: Streak::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_some()
    }

    /// Transition the task-level status.
    ///
    /// Returns an error and leaves the task untouched if the transition
    /// is invalid.
    pub fn transition_to(&mut self, to: TaskStatus) -> Result<Event, TaskTransitionError> {
        if !self.status.can_transition_to(&to) {
            return Err(TaskTransitionError {
                from: self.status,
                to,
            });
        }
        let from = self.status;
        self.status = to;
        self.updated_at = Utc::now();
        Ok(Event::TaskStatusChanged {
            task_id: self.id.clone(),
            from,
            to,
            at: self.updated_at,
        })
    }

    /// Complete the task. For recurring tasks this completes the
    /// instance for `date` and advances the streak; one-off tasks ignore
    /// `date` and complete at the task level.
    pub fn complete_on(&mut self, date: NaiveDate) -> Result<Event, TaskTransitionError> {
        let previous = match &self.recurrence {
            Some(recurrence) => recurrence.previous_occurrence(date),
            None => return self.transition_to(TaskStatus::Completed),
        };

        let instance = self.instance_mut(date);
        let from = instance.status;
        if !from.can_transition_to(&TaskStatus::Completed) {
            return Err(TaskTransitionError {
                from,
                to: TaskStatus::Completed,
            });
        }
        let now = Utc::now();
        instance.status = TaskStatus::Completed;
        instance.completed_at = Some(now);
        self.streak.record(date, previous);
        self.updated_at = now;
        Ok(Event::TaskStatusChanged {
            task_id: self.id.clone(),
            from,
            to: TaskStatus::Completed,
            at: now,
        })
    }

    /// Instance for `date`, materialized from the stage template on first
    /// access. Cloned stages come back reset to `Upcoming`.
    pub fn instance_mut(&mut self, date: NaiveDate) -> &mut RecurrenceInstance {
        if !self.recurrence_instances.contains_key(&date) {
            let mut stages = self.stages.clone();
            for stage in &mut stages {
                stage.reset();
            }
            self.recurrence_instances.insert(
                date,
                RecurrenceInstance {
                    status: TaskStatus::Pending,
                    stages,
                    completed_at: None,
                },
            );
        }
        self.recurrence_instances.entry(date).or_default()
    }

    /// Stages to display for `date`: the instance's stages for recurring
    /// tasks (template until the instance materializes), the template
    /// otherwise.
    pub fn stages_for(&self, date: Option<NaiveDate>) -> &[Stage] {
        match (self.is_recurring(), date) {
            (true, Some(date)) => self
                .recurrence_instances
                .get(&date)
                .map(|instance| instance.stages.as_slice())
                .unwrap_or(&self.stages),
            _ => &self.stages,
        }
    }

    /// Add a stage to the template, or to the instance for `date` on a
    /// recurring task.
    pub fn add_stage(&mut self, stage: Stage, date: Option<NaiveDate>) {
        match (self.is_recurring(), date) {
            (true, Some(date)) => self.instance_mut(date).stages.push(stage),
            _ => self.stages.push(stage),
        }
        self.updated_at = Utc::now();
    }

    /// Change a stage's status, resolving through the instance for
    /// recurring tasks. `force` bypasses the transition table (the
    /// correction popup); the `completed` mirror is maintained either way.
    pub fn set_stage_status(
        &mut self,
        stage_id: &str,
        date: Option<NaiveDate>,
        to: StageStatus,
        force: bool,
    ) -> Result<Event, StageUpdateError> {
        let task_id = self.id.clone();
        let stage = self
            .stage_mut(stage_id, date)
            .ok_or_else(|| StageUpdateError::NotFound(stage_id.to_string()))?;
        let from = stage.status;
        if force {
            stage.force_status(to);
        } else {
            stage.transition(to)?;
        }
        let stage_id = stage.id.clone();
        self.updated_at = Utc::now();
        Ok(Event::StageStatusChanged {
            task_id,
            stage_id,
            from,
            to,
            forced: force,
            at: self.updated_at,
        })
    }

    /// Look up a stage mutably, materializing the instance for recurring
    /// tasks when a date is given.
    pub fn stage_mut(&mut self, stage_id: &str, date: Option<NaiveDate>) -> Option<&mut Stage> {
        let stages = match (self.is_recurring(), date) {
            (true, Some(date)) => &mut self.instance_mut(date).stages,
            _ => &mut self.stages,
        };
        stages.iter_mut().find(|stage| stage.id == stage_id)
    }

    /// Append a comment. Comments are shared across recurrence instances.
    pub fn add_comment(&mut self, text: impl Into<String>) -> Comment {
        let comment = Comment::new(text);
        self.comments.push(comment.clone());
        self.updated_at = Utc::now();
        comment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn task_status_default() {
        assert_eq!(TaskStatus::default(), TaskStatus::Pending);
    }

    #[test]
    fn task_status_transition_table() {
        assert!(TaskStatus::Pending.can_transition_to(&TaskStatus::InProgress));
        assert!(TaskStatus::Pending.can_transition_to(&TaskStatus::Completed));
        assert!(TaskStatus::InProgress.can_transition_to(&TaskStatus::Pending));
        assert!(TaskStatus::InProgress.can_transition_to(&TaskStatus::Completed));
        assert!(!TaskStatus::Completed.can_transition_to(&TaskStatus::Pending));
        assert!(TaskStatus::Completed.valid_transitions().is_empty());
    }

    #[test]
    fn task_status_legacy_labels() {
        assert_eq!(
            serde_json::to_value(TaskStatus::InProgress).unwrap(),
            "In Progress"
        );
        assert_eq!(
            serde_json::from_value::<TaskStatus>("In Progress".into()).unwrap(),
            TaskStatus::InProgress
        );
    }

    #[test]
    fn task_creation() {
        let task = Task::new("Write report");
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.priority, Priority::Medium);
        assert!(!task.backlog);
        assert!(task.stages.is_empty());
        assert_eq!(task.streak.count, 0);
    }

    #[test]
    fn task_transition_and_rejection() {
        let mut task = Task::new("Write report");
        assert!(task.transition_to(TaskStatus::InProgress).is_ok());
        assert!(task.transition_to(TaskStatus::Completed).is_ok());

        let err = task.transition_to(TaskStatus::InProgress).unwrap_err();
        assert_eq!(err.from, TaskStatus::Completed);
        assert_eq!(task.status, TaskStatus::Completed);
    }

    #[test]
    fn transition_emits_event() {
        let mut task = Task::new("Write report");
        let event = task.transition_to(TaskStatus::InProgress).unwrap();
        match event {
            Event::TaskStatusChanged { from, to, .. } => {
                assert_eq!(from, TaskStatus::Pending);
                assert_eq!(to, TaskStatus::InProgress);
            }
            other => panic!("expected TaskStatusChanged, got {other:?}"),
        }
    }

    #[test]
    fn recurrence_rules() {
        // 2026-08-07 is a Friday.
        assert!(Recurrence::Daily.occurs_on(d("2026-08-07")));
        assert!(Recurrence::Weekdays.occurs_on(d("2026-08-07")));
        assert!(!Recurrence::Weekdays.occurs_on(d("2026-08-08"))); // Saturday
        assert!(!Recurrence::Weekdays.occurs_on(d("2026-08-09"))); // Sunday
        assert!(Recurrence::Weekly { weekday: 5 }.occurs_on(d("2026-08-07")));
        assert!(!Recurrence::Weekly { weekday: 5 }.occurs_on(d("2026-08-08")));
    }

    #[test]
    fn previous_occurrence_skips_weekends() {
        // Monday's previous weekday occurrence is Friday.
        assert_eq!(
            Recurrence::Weekdays.previous_occurrence(d("2026-08-10")),
            Some(d("2026-08-07"))
        );
        assert_eq!(
            Recurrence::Daily.previous_occurrence(d("2026-08-10")),
            Some(d("2026-08-09"))
        );
        assert_eq!(
            Recurrence::Weekly { weekday: 5 }.previous_occurrence(d("2026-08-14")),
            Some(d("2026-08-07"))
        );
    }

    #[test]
    fn instance_materializes_from_template_reset() {
        let mut task = Task::new("Morning routine");
        task.recurrence = Some(Recurrence::Daily);
        let mut stage = Stage::new("Stretch", 420, 15);
        stage.force_status(StageStatus::Done);
        task.stages.push(stage);

        let instance = task.instance_mut(d("2026-08-07"));
        assert_eq!(instance.stages.len(), 1);
        assert_eq!(instance.stages[0].status, StageStatus::Upcoming);
        assert!(!instance.stages[0].completed);

        // The template keeps its own state.
        assert_eq!(task.stages[0].status, StageStatus::Done);
    }

    #[test]
    fn stage_updates_resolve_through_the_instance() {
        let mut task = Task::new("Morning routine");
        task.recurrence = Some(Recurrence::Daily);
        task.stages.push(Stage::new("Stretch", 420, 15));
        let stage_id = task.stages[0].id.clone();

        let date = d("2026-08-07");
        task.set_stage_status(&stage_id, Some(date), StageStatus::Process, false)
            .unwrap();

        // Template untouched; instance updated.
        assert_eq!(task.stages[0].status, StageStatus::Upcoming);
        assert_eq!(
            task.stages_for(Some(date))[0].status,
            StageStatus::Process
        );
    }

    #[test]
    fn stage_update_unknown_id() {
        let mut task = Task::new("Morning routine");
        let err = task
            .set_stage_status("missing", None, StageStatus::Process, false)
            .unwrap_err();
        assert!(matches!(err, StageUpdateError::NotFound(_)));
    }

    #[test]
    fn stage_update_respects_table_unless_forced() {
        let mut task = Task::new("Morning routine");
        task.stages.push(Stage::new("Stretch", 420, 15));
        let stage_id = task.stages[0].id.clone();

        let err = task
            .set_stage_status(&stage_id, None, StageStatus::Done, false)
            .unwrap_err();
        assert!(matches!(err, StageUpdateError::Transition(_)));
        assert_eq!(task.stages[0].status, StageStatus::Upcoming);

        let event = task
            .set_stage_status(&stage_id, None, StageStatus::Done, true)
            .unwrap();
        assert!(matches!(event, Event::StageStatusChanged { forced: true, .. }));
        assert!(task.stages[0].completed);
    }

    #[test]
    fn completing_consecutive_instances_builds_a_streak() {
        let mut task = Task::new("Morning routine");
        task.recurrence = Some(Recurrence::Daily);

        task.complete_on(d("2026-08-05")).unwrap();
        task.complete_on(d("2026-08-06")).unwrap();
        task.complete_on(d("2026-08-07")).unwrap();
        assert_eq!(task.streak.count, 3);

        // A missed day resets the run.
        task.complete_on(d("2026-08-09")).unwrap();
        assert_eq!(task.streak.count, 1);
    }

    #[test]
    fn completing_an_instance_twice_is_rejected() {
        let mut task = Task::new("Morning routine");
        task.recurrence = Some(Recurrence::Daily);
        let date = d("2026-08-07");

        task.complete_on(date).unwrap();
        let err = task.complete_on(date).unwrap_err();
        assert_eq!(err.from, TaskStatus::Completed);
        assert_eq!(task.streak.count, 1);
    }

    #[test]
    fn comments_are_shared_across_instances() {
        let mut task = Task::new("Morning routine");
        task.recurrence = Some(Recurrence::Daily);
        task.instance_mut(d("2026-08-06"));
        task.instance_mut(d("2026-08-07"));

        task.add_comment("felt great");
        assert_eq!(task.comments.len(), 1);
        // Comments live on the task, not inside any instance.
        let json = serde_json::to_value(&task).unwrap();
        assert!(json["recurrence_instances"]["2026-08-06"]
            .get("comments")
            .is_none());
    }

    #[test]
    fn one_off_completion_ignores_the_instance_path() {
        let mut task = Task::new("Write report");
        task.complete_on(d("2026-08-07")).unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
        assert!(task.recurrence_instances.is_empty());
    }

    #[test]
    fn task_serialization_round_trips() {
        let mut task = Task::new("Morning routine");
        task.recurrence = Some(Recurrence::Weekly { weekday: 1 });
        task.priority = Priority::High;
        task.stages.push(Stage::new("Stretch", 420, 15));
        task.instance_mut(d("2026-08-03"));
        task.add_comment("note");

        let json = serde_json::to_string(&task).unwrap();
        let decoded: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, task);
    }
}
