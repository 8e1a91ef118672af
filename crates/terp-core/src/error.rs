//! Core error types for terp-core.
//!
//! A thiserror-based error hierarchy. Calculation itself (pairing,
//! rounding, break/surcharge engines, daily/monthly aggregation) never
//! returns `Result` — it always produces a value, with failure expressed
//! as error codes on that value. `Result`/`?` is reserved for repository
//! I/O, configuration ingestion, and scheduler dispatch, which is where
//! these types are used.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for terp-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Repository I/O errors (the abstract boundary of spec.md §6).
    #[error("repository error: {0}")]
    Repo(#[from] RepoError),

    /// Configuration-related errors.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Scheduler dispatch errors.
    #[error("scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    /// Configuration invariant violations, rejected at write-time per spec.md §7.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context.
    #[error("{0}")]
    Custom(String),
}

/// Repository-boundary errors. The recalculator retries transient ones
/// with bounded exponential backoff per spec.md §7; persistent failures
/// propagate and mark the batch failed.
#[derive(Error, Debug)]
pub enum RepoError {
    /// The underlying store could not be reached or opened.
    #[error("failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// A read or write against the store failed.
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Schema migration failed.
    #[error("migration failed: {0}")]
    MigrationFailed(String),

    /// No row found for a key that was expected to exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A uniqueness constraint was violated (e.g. two non-cancelled
    /// absences for the same employee/date, or a second in-flight
    /// `TaskExecution` for the same task).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The store is transiently unavailable; safe to retry.
    #[error("store temporarily unavailable: {0}")]
    Transient(String),
}

impl RepoError {
    /// Whether the recalculator should retry this failure with backoff,
    /// per spec.md §7.
    pub fn is_transient(&self) -> bool {
        matches!(self, RepoError::Transient(_))
    }
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration.
    #[error("failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration.
    #[error("failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value.
    #[error("invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Missing required configuration key.
    #[error("missing required configuration key: {0}")]
    MissingKey(String),

    /// Failed to parse configuration.
    #[error("failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Scheduler dispatch errors.
#[derive(Error, Debug)]
pub enum SchedulerError {
    /// No executor is registered for a task type or macro action code.
    #[error("no executor registered for '{0}'")]
    UnknownExecutor(String),

    /// A task execution exceeded its configured timeout and was
    /// force-transitioned to `failed`.
    #[error("executor for task {task_id} timed out after {timeout_secs}s")]
    Timeout { task_id: String, timeout_secs: u64 },

    /// The executor body returned an error.
    #[error("executor for task {task_id} failed: {message}")]
    ExecutorFailed { task_id: String, message: String },

    /// A `RecurrenceSpec` failed validation at write-time (spec.md §7).
    #[error("invalid recurrence: {0}")]
    InvalidRecurrence(String),
}

/// Validation errors raised when ingesting configuration that violates a
/// stored invariant (e.g. an overnight `SurchargeConfig`).
#[derive(Error, Debug)]
pub enum ValidationError {
    /// A `SurchargeConfig`'s `[timeFrom, timeTo)` crosses midnight; must
    /// be split via `splitOvernight` before being persisted (spec.md §4.3).
    #[error("surcharge config [{time_from}, {time_to}) crosses midnight; split before storing")]
    SurchargeCrossesMidnight { time_from: u16, time_to: u16 },

    /// A minute-of-day value fell outside its valid range.
    #[error("minute-of-day value {value} out of range {min}..={max}")]
    MinuteOutOfRange { value: i32, min: u16, max: u16 },

    /// Invalid value for a named field.
    #[error("invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<rusqlite::Error> for RepoError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _msg) => {
                if code.code == rusqlite::ErrorCode::DatabaseLocked {
                    RepoError::Transient("database is locked".to_string())
                } else {
                    RepoError::QueryFailed(err.to_string())
                }
            }
            rusqlite::Error::QueryReturnedNoRows => RepoError::NotFound(err.to_string()),
            _ => RepoError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for `CoreError`.
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
