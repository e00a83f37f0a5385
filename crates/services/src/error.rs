//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by the text-completion client.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompletionError {
    #[error("text completion is not configured")]
    Disabled,
    #[error("text completion returned an empty response")]
    EmptyResponse,
    #[error("text completion request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    /// Message reported by the completion API, shown to the learner as-is.
    #[error("{0}")]
    Api(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted while opening or driving a tutorial.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TutorialError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Content(#[from] tutor_core::Error),
}
