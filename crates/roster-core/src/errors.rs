//! Cross-cutting error types for Roster.
//!
//! Every reducer in this crate returns `Result<_, CoreError>`. A rejected
//! command never mutates state, so callers can retry freely and tell
//! "already done" (`InvalidTransition`) apart from "wrong input"
//! (`NotFound`, `Validation`). Storage errors live in `roster-db`.

use thiserror::Error;

use crate::enums::EntityType;

/// Errors that can be raised by any Roster crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: EntityType, id: String },

    /// A command was issued in a state that does not accept it.
    #[error("Invalid state transition: {entity_type} {id} cannot {operation} from {from}")]
    InvalidTransition {
        entity_type: EntityType,
        id: String,
        from: String,
        operation: &'static str,
    },

    /// Data failed validation (format, constraints).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CoreError {
    pub fn not_found(entity_type: EntityType, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    pub fn invalid_transition(
        entity_type: EntityType,
        id: impl Into<String>,
        from: impl ToString,
        operation: &'static str,
    ) -> Self {
        Self::InvalidTransition {
            entity_type,
            id: id.into(),
            from: from.to_string(),
            operation,
        }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    #[must_use]
    pub const fn is_invalid_transition(&self) -> bool {
        matches!(self, Self::InvalidTransition { .. })
    }
}
