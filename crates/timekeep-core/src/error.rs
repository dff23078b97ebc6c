//! Core error types for timekeep-core.
//!
//! This module defines the error hierarchy using thiserror. Domain-specific
//! transition errors live next to their state machines (`timer`, `task`)
//! and convert into [`CoreError`] at the library boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for timekeep-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Malformed duration strings
    #[error("duration error: {0}")]
    Duration(#[from] DurationError),

    /// Rejected timer status transitions
    #[error("transition error: {0}")]
    Transition(#[from] crate::timer::TransitionError),

    /// Database-related errors
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Raised instead of propagating garbage when a stored duration string
/// cannot be read. `NaN`-like values must never reach the percentage math.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DurationError {
    /// The string is not `MM:SS` or `HH:MM:SS` with numeric fields.
    #[error("malformed duration '{input}': expected MM:SS or HH:MM:SS")]
    Malformed { input: String },
}

impl DurationError {
    pub fn malformed(input: impl Into<String>) -> Self {
        DurationError::Malformed {
            input: input.into(),
        }
    }
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("unknown configuration key: {0}")]
    UnknownKey(String),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for CoreError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        CoreError::Custom(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
