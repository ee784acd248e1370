//! Engine error taxonomy.
//!
//! Every failure surfaced to a caller maps to one stable [`ErrorKind`]. A lost
//! compare-and-swap on completion is not an error: the operation reports an
//! idempotent no-op instead.

use std::fmt;

use serde::Serialize;

use hoops_core::enums::Role;
use hoops_core::validation::ValidationError;
use hoops_storage::StorageError;

/// Errors returned by engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A referenced profile, goal, level, or weekly goal does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A weekly goal submission outside its window (or after deactivation).
    #[error("weekly goal {weekly_goal_id} is closed: {reason}")]
    Expired { weekly_goal_id: i64, reason: String },

    /// Malformed input, rejected before any mutation.
    #[error("validation error: {0}")]
    Validation(String),

    /// The caller's role may not perform the operation.
    #[error("role '{role}' cannot {action}")]
    Forbidden { role: Role, action: &'static str },

    /// The store failed; nothing was written.
    #[error("storage failure: {0}")]
    Storage(#[source] StorageError),
}

/// Stable, machine-readable error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Expired,
    ValidationError,
    Forbidden,
    StorageFailure,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Expired => "expired",
            Self::ValidationError => "validation_error",
            Self::Forbidden => "forbidden",
            Self::StorageFailure => "storage_failure",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl EngineError {
    /// Creates an [`EngineError::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Creates an [`EngineError::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Returns the stable category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Expired { .. } => ErrorKind::Expired,
            Self::Validation(_) => ErrorKind::ValidationError,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::Storage(_) => ErrorKind::StorageFailure,
        }
    }
}

impl From<StorageError> for EngineError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound { entity, id } => Self::NotFound { entity, id },
            StorageError::Validation { message } => Self::Validation(message),
            other => Self::Storage(other),
        }
    }
}

impl From<ValidationError> for EngineError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e.to_string())
    }
}

/// Convenience alias used throughout the engine.
pub type Result<T> = std::result::Result<T, EngineError>;
