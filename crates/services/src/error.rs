//! Shared error types for the services crate.

use thiserror::Error;

use algolearn_core::model::{OptionId, QuestionId};
use algolearn_core::progress::CompletionBlocker;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by module sessions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("question {0} is not part of this module")]
    UnknownQuestion(QuestionId),
    #[error("option {option} does not belong to question {question}")]
    UnknownOption {
        question: QuestionId,
        option: OptionId,
    },
    #[error("module cannot be completed yet: {0}")]
    Incomplete(#[from] CompletionBlocker),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
