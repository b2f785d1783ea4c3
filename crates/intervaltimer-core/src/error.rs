//! Core error types for intervaltimer-core.
//!
//! The countdown engine itself never fails; these errors belong to the
//! outer layers (storage, configuration, and workout editing).

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for intervaltimer-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors raised while editing a workout
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A workout id that the store does not know about
    #[error("Workout {id} not found")]
    NotFound { id: u64 },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A block must repeat at least once
    #[error("Invalid rounds: {0} (a block needs at least one round)")]
    InvalidRounds(u32),

    /// Blocks only hold exercises
    #[error("Block '{block}' cannot contain another block")]
    NestedBlock { block: String },

    /// Duration text could not be parsed or is zero
    #[error("Invalid duration '{0}' (expected MM:SS, seconds, or e.g. 1m30s)")]
    InvalidDuration(String),

    /// Color text could not be parsed
    #[error("Invalid color '{0}' (expected #RRGGBB, a palette name, or 'unset')")]
    InvalidColor(String),

    /// Exercise kind text could not be parsed
    #[error("Invalid exercise kind '{0}' (expected prep, work, or rest)")]
    InvalidKind(String),

    /// Element id not present in the workout or block being edited
    #[error("Element {id} not found")]
    ElementNotFound { id: u64 },
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

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
