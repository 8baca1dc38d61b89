use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
/// Errors returned by corpus stores and corpus utilities.
pub enum CorpusError {
    #[error("document not found: {id}")]
    NotFound { id: Uuid },

    #[error("invalid document: {reason}")]
    InvalidDocument { reason: String },

    #[error("storage path unavailable: {path}")]
    StorageUnavailable { path: PathBuf },

    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {reason}")]
    Serialization { reason: String },

    #[error("corrupt document file {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("storage task failed: {reason}")]
    TaskFailed { reason: String },
}

impl From<serde_json::Error> for CorpusError {
    fn from(err: serde_json::Error) -> Self {
        CorpusError::Serialization {
            reason: err.to_string(),
        }
    }
}

impl From<tokio::task::JoinError> for CorpusError {
    fn from(err: tokio::task::JoinError) -> Self {
        CorpusError::TaskFailed {
            reason: err.to_string(),
        }
    }
}

/// Convenience result type for corpus operations.
pub type CorpusResult<T> = Result<T, CorpusError>;
