//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::GameResultError;
use storage::repository::StorageError;

/// Errors emitted by `StatisticsStore`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StatisticsError {
    #[error("persisted value for {key} is invalid: {reason}")]
    Corrupt { key: &'static str, reason: String },
    #[error("value for {key} does not fit in storage")]
    Overflow { key: &'static str },
    #[error(transparent)]
    InvalidResult(#[from] GameResultError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors reported by a question source.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionSourceError {
    #[error("no questions available")]
    Exhausted,
    #[error("failed to load questions: {0}")]
    Load(String),
}

/// Errors emitted when talking to a running quiz session.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum RuntimeError {
    #[error("quiz session has stopped")]
    Closed,
}
