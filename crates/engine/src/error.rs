//! The module contains the errors the engine can surface.
//!
//! Every failure maps to "nothing was changed": preconditions are checked
//! before any row is written, and the unit of work rolls back on error.
//!
//! - [`NotFound`]: a referenced budget, wallet, category, goal, transaction
//!   or transfer does not exist.
//! - [`InvalidArgument`]: a precondition failed (non-positive amount,
//!   category/transaction kind mismatch, cross-budget transfer, ...).
//! - [`Conflict`]: the store detected a concurrent writer during the atomic
//!   save; the caller retries the whole mutation from fresh state.
//!
//! [`NotFound`]: EngineError::NotFound
//! [`InvalidArgument`]: EngineError::InvalidArgument
//! [`Conflict`]: EngineError::Conflict
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Database(DbErr),
}

impl From<DbErr> for EngineError {
    fn from(err: DbErr) -> Self {
        match err {
            // A row we loaded earlier in this unit of work vanished before the
            // update landed: a concurrent writer won the race.
            DbErr::RecordNotUpdated => {
                EngineError::Conflict("concurrent modification detected".to_string())
            }
            other => EngineError::Database(other),
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::InvalidArgument(a), Self::InvalidArgument(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
