//! Timer control commands for CLI.

use chrono::{NaiveDate, Utc};
use clap::Subcommand;
use timekeep_core::bridge::LiveActivityUpdate;
use timekeep_core::duration::parse_duration;
use timekeep_core::storage::Database;
use timekeep_core::timer::Timer;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Create a new countdown timer
    Create {
        /// Timer title
        title: String,
        /// Total duration, "MM:SS" or "HH:MM:SS"
        duration: String,
        /// Category ID
        #[arg(long)]
        category: Option<String>,
        /// Date the timer is scheduled for (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },
    /// List timers as JSON
    List,
    /// Start an upcoming timer
    Start {
        /// Timer ID
        id: String,
    },
    /// Pause a running timer
    Pause {
        /// Timer ID
        id: String,
    },
    /// Resume a paused timer
    Resume {
        /// Timer ID
        id: String,
    },
    /// Complete a timer before its countdown expires
    Complete {
        /// Timer ID
        id: String,
    },
    /// Add seconds to a timer's allocation
    Borrow {
        /// Timer ID
        id: String,
        /// Seconds to add
        seconds: u64,
    },
    /// Acknowledge a completed timer (one-shot)
    Ack {
        /// Timer ID
        id: String,
    },
    /// Tick all running timers, printing completion events
    Tick,
    /// Print a timer state snapshot
    Status {
        /// Timer ID
        id: String,
    },
    /// Print the live-activity payload for a timer
    Activity {
        /// Timer ID
        id: String,
    },
    /// Delete a timer
    Delete {
        /// Timer ID
        id: String,
    },
}

fn find_timer<'a>(
    timers: &'a mut [Timer],
    id: &str,
) -> Result<&'a mut Timer, Box<dyn std::error::Error>> {
    timers
        .iter_mut()
        .find(|timer| timer.id == id)
        .ok_or_else(|| format!("timer not found: {id}").into())
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let mut timers = db.load_timers()?;

    match action {
        TimerAction::Create {
            title,
            duration,
            category,
            date,
        } => {
            let total_secs = parse_duration(&duration)?;
            let mut timer = Timer::new(title, total_secs);
            timer.category_id = category;
            timer.for_date = match date {
                Some(date) => Some(date.parse::<NaiveDate>()?),
                None => None,
            };
            println!("{}", serde_json::to_string_pretty(&timer)?);
            timers.push(timer);
        }
        TimerAction::List => {
            println!("{}", serde_json::to_string_pretty(&timers)?);
        }
        TimerAction::Start { id } => {
            let event = find_timer(&mut timers, &id)?.start()?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        TimerAction::Pause { id } => {
            let event = find_timer(&mut timers, &id)?.pause()?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        TimerAction::Resume { id } => {
            let event = find_timer(&mut timers, &id)?.resume()?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        TimerAction::Complete { id } => {
            let timer = find_timer(&mut timers, &id)?;
            let event = timer.complete()?;
            db.record_completed_timer(timer, Utc::now())?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        TimerAction::Borrow { id, seconds } => {
            let event = find_timer(&mut timers, &id)?.borrow(seconds)?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        TimerAction::Ack { id } => {
            let event = find_timer(&mut timers, &id)?.acknowledge()?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        TimerAction::Tick => {
            let mut events = Vec::new();
            for timer in timers.iter_mut() {
                if let Some(event) = timer.tick() {
                    db.record_completed_timer(timer, Utc::now())?;
                    events.push(event);
                }
            }
            println!("{}", serde_json::to_string_pretty(&events)?);
        }
        TimerAction::Status { id } => {
            let timer = find_timer(&mut timers, &id)?;
            // Tick first so the snapshot reflects the wall clock.
            if timer.tick().is_some() {
                db.record_completed_timer(timer, Utc::now())?;
            }
            println!("{}", serde_json::to_string_pretty(&timer.snapshot())?);
        }
        TimerAction::Activity { id } => {
            let timer = find_timer(&mut timers, &id)?;
            let update = LiveActivityUpdate::for_timer(timer, Utc::now());
            println!("{}", serde_json::to_string_pretty(&update)?);
        }
        TimerAction::Delete { id } => {
            let before = timers.len();
            timers.retain(|timer| timer.id != id);
            if timers.len() == before {
                return Err(format!("timer not found: {id}").into());
            }
            println!("deleted: {id}");
        }
    }

    db.save_timers(&timers)?;
    Ok(())
}
