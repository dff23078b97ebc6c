//! Task management commands for CLI.

use chrono::{NaiveDate, Utc};
use clap::Subcommand;
use timekeep_core::storage::Database;
use timekeep_core::task::{Priority, Recurrence, Task, TaskStatus};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task
    Create {
        /// Task title
        title: String,
        /// Priority: low, medium, or high
        #[arg(long, default_value = "medium")]
        priority: String,
        /// Date the task is scheduled for (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
        /// Put the task on the backlog
        #[arg(long)]
        backlog: bool,
        /// Recurrence: daily, weekdays, or weekly:<0-6> (0 = Sunday)
        #[arg(long)]
        recur: Option<String>,
    },
    /// List tasks as JSON
    List {
        /// Filter by status: pending, in-progress, or completed
        #[arg(long)]
        status: Option<String>,
    },
    /// Get task details
    Get {
        /// Task ID
        id: String,
    },
    /// Start a task
    Start {
        /// Task ID
        id: String,
    },
    /// Send a task back to pending
    Defer {
        /// Task ID
        id: String,
    },
    /// Complete a task (for recurring tasks, the given date's instance)
    Complete {
        /// Task ID
        id: String,
        /// Occurrence date (YYYY-MM-DD); defaults to today
        #[arg(long)]
        date: Option<String>,
    },
    /// Add a comment to a task
    Comment {
        /// Task ID
        id: String,
        /// Comment text
        text: String,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },
}

fn parse_priority(s: &str) -> Result<Priority, Box<dyn std::error::Error>> {
    match s {
        "low" => Ok(Priority::Low),
        "medium" => Ok(Priority::Medium),
        "high" => Ok(Priority::High),
        other => Err(format!("unknown priority: {other}").into()),
    }
}

fn parse_status(s: &str) -> Result<TaskStatus, Box<dyn std::error::Error>> {
    match s {
        "pending" => Ok(TaskStatus::Pending),
        "in-progress" => Ok(TaskStatus::InProgress),
        "completed" => Ok(TaskStatus::Completed),
        other => Err(format!("unknown status: {other}").into()),
    }
}

fn parse_recurrence(s: &str) -> Result<Recurrence, Box<dyn std::error::Error>> {
    match s {
        "daily" => Ok(Recurrence::Daily),
        "weekdays" => Ok(Recurrence::Weekdays),
        other => other
            .strip_prefix("weekly:")
            .and_then(|day| day.parse::<u8>().ok())
            .filter(|day| *day <= 6)
            .map(|weekday| Recurrence::Weekly { weekday })
            .ok_or_else(|| format!("unknown recurrence: {other}").into()),
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

pub fn run(action: TaskAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let mut tasks = db.load_tasks()?;

    match action {
        TaskAction::Create {
            title,
            priority,
            date,
            backlog,
            recur,
        } => {
            let mut task = Task::new(title);
            task.priority = parse_priority(&priority)?;
            task.backlog = backlog;
            task.for_date = match date {
                Some(date) => Some(date.parse::<NaiveDate>()?),
                None => None,
            };
            task.recurrence = match recur {
                Some(recur) => Some(parse_recurrence(&recur)?),
                None => None,
            };
            println!("{}", serde_json::to_string_pretty(&task)?);
            tasks.push(task);
        }
        TaskAction::List { status } => {
            let filter = match status {
                Some(status) => Some(parse_status(&status)?),
                None => None,
            };
            let filtered: Vec<_> = tasks
                .iter()
                .filter(|task| filter.map_or(true, |wanted| task.status == wanted))
                .collect();
            println!("{}", serde_json::to_string_pretty(&filtered)?);
        }
        TaskAction::Get { id } => {
            let task = find_task(&mut tasks, &id)?;
            println!("{}", serde_json::to_string_pretty(task)?);
        }
        TaskAction::Start { id } => {
            let event = find_task(&mut tasks, &id)?.transition_to(TaskStatus::InProgress)?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        TaskAction::Defer { id } => {
            let event = find_task(&mut tasks, &id)?.transition_to(TaskStatus::Pending)?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        TaskAction::Complete { id, date } => {
            let date = match date {
                Some(date) => date.parse::<NaiveDate>()?,
                None => Utc::now().date_naive(),
            };
            let event = find_task(&mut tasks, &id)?.complete_on(date)?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        TaskAction::Comment { id, text } => {
            let comment = find_task(&mut tasks, &id)?.add_comment(text);
            println!("{}", serde_json::to_string_pretty(&comment)?);
        }
        TaskAction::Delete { id } => {
            let before = tasks.len();
            tasks.retain(|task| task.id != id);
            if tasks.len() == before {
                return Err(format!("task not found: {id}").into());
            }
            println!("deleted: {id}");
        }
    }

    db.save_tasks(&tasks)?;
    Ok(())
}
