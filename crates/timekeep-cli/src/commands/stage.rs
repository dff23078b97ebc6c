//! Stage management commands for CLI.
//!
//! Stages resolve through the per-date instance when the owning task is
//! recurring and a `--date` is given.

use chrono::NaiveDate;
use clap::Subcommand;
use timekeep_core::duration::parse_clock_hhmm;
use timekeep_core::storage::Database;
use timekeep_core::task::{Stage, StageStatus, Task};

#[derive(Subcommand)]
pub enum StageAction {
    /// Add a stage to a task
    Add {
        /// Task ID
        task_id: String,
        /// Stage text
        text: String,
        /// Scheduled start, wall-clock "HH:MM"
        #[arg(long, default_value = "09:00")]
        start: String,
        /// Duration in minutes
        #[arg(long, default_value = "30")]
        duration: u32,
        /// Instance date for recurring tasks (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },
    /// List stages for a task
    List {
        /// Task ID
        task_id: String,
        /// Instance date for recurring tasks (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },
    /// Start a stage
    Start {
        /// Task ID
        task_id: String,
        /// Stage ID
        stage_id: String,
        /// Instance date for recurring tasks (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },
    /// Mark a stage done
    Done {
        /// Task ID
        task_id: String,
        /// Stage ID
        stage_id: String,
        /// Instance date for recurring tasks (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },
    /// Mark a stage undone (failed/skipped)
    Undone {
        /// Task ID
        task_id: String,
        /// Stage ID
        stage_id: String,
        /// Instance date for recurring tasks (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },
    /// Force a stage to any status (free-form correction)
    Set {
        /// Task ID
        task_id: String,
        /// Stage ID
        stage_id: String,
        /// Target status: upcoming, process, done, or undone
        status: String,
        /// Instance date for recurring tasks (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },
}

fn parse_date(date: Option<String>) -> Result<Option<NaiveDate>, Box<dyn std::error::Error>> {
    match date {
        Some(date) => Ok(Some(date.parse::<NaiveDate>()?)),
        None => Ok(None),
    }
}

fn parse_stage_status(s: &str) -> Result<StageStatus, Box<dyn std::error::Error>> {
    match s {
        "upcoming" => Ok(StageStatus::Upcoming),
        "process" => Ok(StageStatus::Process),
        "done" => Ok(StageStatus::Done),
        "undone" => Ok(StageStatus::Undone),
        other => Err(format!("unknown stage status: {other}").into()),
    }
}

fn find_task<'a>(
    tasks: &'a mut [Task],
    id: &str,
) -> Result<&'a mut Task, Box<dyn std::error::Error>> {
    tasks
        .iter_mut()
        .find(|task| task.id == id)
        .ok_or_else(|| format!("task not found: {id}").into())
}

pub fn run(action: StageAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let mut tasks = db.load_tasks()?;

    match action {
        StageAction::Add {
            task_id,
            text,
            start,
            duration,
            date,
        } => {
            let date = parse_date(date)?;
            let stage = Stage::new(text, parse_clock_hhmm(&start)?, duration);
            find_task(&mut tasks, &task_id)?.add_stage(stage.clone(), date);
            println!("{}", serde_json::to_string_pretty(&stage)?);
        }
        StageAction::List { task_id, date } => {
            let date = parse_date(date)?;
            let task = find_task(&mut tasks, &task_id)?;
            println!("{}", serde_json::to_string_pretty(task.stages_for(date))?);
        }
        StageAction::Start {
            task_id,
            stage_id,
            date,
        } => {
            let date = parse_date(date)?;
            let event = find_task(&mut tasks, &task_id)?.set_stage_status(
                &stage_id,
                date,
                StageStatus::Process,
                false,
            )?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        StageAction::Done {
            task_id,
            stage_id,
            date,
        } => {
            let date = parse_date(date)?;
            let event = find_task(&mut tasks, &task_id)?.set_stage_status(
                &stage_id,
                date,
                StageStatus::Done,
                false,
            )?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        StageAction::Undone {
            task_id,
            stage_id,
            date,
        } => {
            let date = parse_date(date)?;
            let event = find_task(&mut tasks, &task_id)?.set_stage_status(
                &stage_id,
                date,
                StageStatus::Undone,
                false,
            )?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        StageAction::Set {
            task_id,
            stage_id,
            status,
            date,
        } => {
            let date = parse_date(date)?;
            let status = parse_stage_status(&status)?;
            let event =
                find_task(&mut tasks, &task_id)?.set_stage_status(&stage_id, date, status, true)?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
    }

    db.save_tasks(&tasks)?;
    Ok(())
}
