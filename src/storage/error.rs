//! Storage layer error types
//!
//! All errors that can occur while talking to the repository are defined here.

use std::path::PathBuf;

use thiserror::Error;

/// the main error type for storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// error from the underlying Git library
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    /// no repository metadata at the root, or it vanished under an open handle
    #[error("repository not initialized: {0}")]
    NotInitialized(PathBuf),

    /// init was called on a root that already carries metadata
    #[error("repository already initialized: {0}")]
    AlreadyInitialized(PathBuf),

    /// a revision could not be recorded
    #[error("commit of {file} failed: {reason}")]
    CommitFailed { file: String, reason: String },

    /// the requested revision does not exist
    #[error("revision not found: {0}")]
    RevisionNotFound(String),

    /// I/O error (filesystem level)
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// invalid UTF-8 in blob content
    #[error("invalid utf-8 in {file}")]
    InvalidUtf8 { file: String },
}

impl StorageError {
    pub(crate) fn commit_failed(file: &str, reason: impl ToString) -> Self {
        StorageError::CommitFailed {
            file: file.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
