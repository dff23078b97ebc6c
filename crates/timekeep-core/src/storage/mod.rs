mod config;
pub mod database;

pub use config::Config;
pub use database::{CompletedTimerRecord, Database, Stats};

use std::path::PathBuf;

/// Returns `~/.config/timekeep[-dev]/` based on TIMEKEEP_ENV.
///
/// Set TIMEKEEP_ENV=dev to use the development data directory, or
/// TIMEKEEP_DATA_DIR to point somewhere else entirely (tests use this
/// for isolated state).
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the directory fails.
pub fn data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Ok(dir) = std::env::var("TIMEKEEP_DATA_DIR") {
        let dir = PathBuf::from(dir);
        std::fs::create_dir_all(&dir)?;
        return Ok(dir);
    }

    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("TIMEKEEP_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("timekeep-dev")
    } else {
        base_dir.join("timekeep")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
