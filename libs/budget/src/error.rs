//! Error taxonomy for the budget core

use common::error::DatabaseError;
use thiserror::Error;

/// Errors surfaced by budget operations
#[derive(Error, Debug)]
pub enum BudgetError {
    /// Missing or malformed input, rejected before any write
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unknown user, cycle or expense, or a user without a current cycle
    #[error("{0} not found")]
    NotFound(String),

    /// The caller does not own the targeted record
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The write collides with an existing record, e.g. a registered email
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Persistence layer failure
    #[error(transparent)]
    Storage(#[from] DatabaseError),

    /// Stored state contradicts an invariant, e.g. a cycle pointer that did not move
    #[error("Inconsistent state: {0}")]
    Inconsistent(String),
}

impl BudgetError {
    pub fn validation(message: impl Into<String>) -> Self {
        BudgetError::Validation(message.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        BudgetError::NotFound(what.into())
    }

    /// Whether retrying the same call could succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            BudgetError::Storage(DatabaseError::Connection(_) | DatabaseError::Unavailable(_))
        )
    }
}

impl From<sqlx::Error> for BudgetError {
    fn from(err: sqlx::Error) -> Self {
        BudgetError::Storage(err.into())
    }
}

/// Type alias for Result with BudgetError
pub type BudgetResult<T> = Result<T, BudgetError>;
