//! Error types for the person record store.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for store and search operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors reported by store and search operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Malformed input; nothing was changed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No record with the given name.
    #[error("No record found for name '{0}'")]
    NotFound(String),

    /// Search ran but nothing matched the query.
    #[error("No records match '{0}'")]
    NoMatches(String),

    /// Writing the backing file failed.
    #[error("Failed to save {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Input rejected before any mutation happened.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Name must not be empty")]
    EmptyName,

    #[error("Name '{0}' already exists")]
    AlreadyExists(String),

    #[error("Invalid birth date/time {year:04}-{month:02}-{day:02} {hour:02}:{minute:02}")]
    InvalidBirthTime {
        year: i64,
        month: i64,
        day: i64,
        hour: i64,
        minute: i64,
    },

    #[error("Latitude must be between -90 and 90 (got {0})")]
    LatitudeOutOfRange(f64),

    #[error("Longitude must be between -180 and 180 (got {0})")]
    LongitudeOutOfRange(f64),

    #[error("No fields to update")]
    NoFieldsToUpdate,

    #[error("Search query must be at least {min} characters after trimming")]
    QueryTooShort { min: usize },

    #[error("Missing name argument")]
    MissingName,

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}

impl StoreError {
    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Validation(_))
    }

    /// True for both an unknown name and a search without matches.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_) | StoreError::NoMatches(_))
    }
}
