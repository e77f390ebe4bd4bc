//! Page store error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::page::{CodecError, InvalidTitleError};
use crate::storage::StorageError;

/// Result type for page store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during page store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Repository layer error.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The page file does not exist.
    #[error("page not found: {0}")]
    NotFound(String),

    /// Filesystem failure on a page file, other than absence.
    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The title can't name a page file.
    #[error("invalid page title: {0}")]
    InvalidTitle(#[from] InvalidTitleError),

    /// Payload doesn't follow the page wire format.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Startup configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Coarse classification of a [`StoreError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotInitialized,
    AlreadyInitialized,
    NotFound,
    IoFailure,
    CommitFailed,
    DecodeFailure,
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Storage(e) => match e {
                StorageError::NotInitialized(_) => ErrorKind::NotInitialized,
                StorageError::AlreadyInitialized(_) => ErrorKind::AlreadyInitialized,
                StorageError::CommitFailed { .. } => ErrorKind::CommitFailed,
                StorageError::RevisionNotFound(_) => ErrorKind::NotFound,
                StorageError::Git(_) | StorageError::Io(_) | StorageError::InvalidUtf8 { .. } => {
                    ErrorKind::IoFailure
                }
            },
            StoreError::NotFound(_) => ErrorKind::NotFound,
            StoreError::Io { .. } => ErrorKind::IoFailure,
            StoreError::InvalidTitle(_) => ErrorKind::DecodeFailure,
            StoreError::Codec(CodecError::Decode(_)) => ErrorKind::DecodeFailure,
            StoreError::Codec(CodecError::Encode { .. }) => ErrorKind::IoFailure,
            StoreError::InvalidConfig(_) => ErrorKind::NotInitialized,
        }
    }

    /// Check if the page (or revision) doesn't exist.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Status an HTTP front end should answer with. Nothing is retried.
    pub fn http_status(&self) -> u16 {
        match self.kind() {
            ErrorKind::NotFound => 404,
            ErrorKind::DecodeFailure => 400,
            _ => 500,
        }
    }
}
