//! Database error types for roster-db.

use roster_core::errors::CoreError;
use thiserror::Error;

/// Errors from database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed or returned unparseable data.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// Invalid state encountered (e.g., bad data in DB).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A command was rejected by the recruitment or shipping reducers.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DatabaseError {
    /// The reducer error behind this failure, if the command was rejected.
    #[must_use]
    pub const fn as_core(&self) -> Option<&CoreError> {
        match self {
            Self::Core(err) => Some(err),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.as_core().is_some_and(CoreError::is_not_found)
    }

    #[must_use]
    pub fn is_invalid_transition(&self) -> bool {
        self.as_core().is_some_and(CoreError::is_invalid_transition)
    }

    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Core(CoreError::Validation(_)))
    }
}
