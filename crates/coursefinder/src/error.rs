//! Error types for the course finder.

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, CourseFinderError>;

/// Errors that can occur while querying or updating course data.
///
/// Parsing user input never fails; only storage and configuration do.
#[derive(Debug, Error)]
pub enum CourseFinderError {
    /// SQLite returned an error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Reading the schema or a config file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A thread panicked while holding the connection lock
    #[error("Database lock poisoned")]
    LockPoisoned,

    /// A configuration value could not be used
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// JSON encoding/decoding failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CourseFinderError {
    /// Returns true if the error came from a UNIQUE/PRIMARY KEY/CHECK constraint.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            CourseFinderError::Database(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation
        )
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        CourseFinderError::Config {
            message: message.into(),
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for CourseFinderError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        CourseFinderError::LockPoisoned
    }
}
