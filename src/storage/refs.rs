//! HEAD resolution.
//!
//! A wiki repository only ever has one line of history, checked out on
//! whatever branch `git init` picked. HEAD is the only ref we read.

use git2::Repository;

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::types::RevisionId;

/// Resolves references.
pub struct RefManager;

impl RefManager {
    /// Get the current HEAD commit, or None on a fresh repository.
    pub fn head_commit(repo: &Repository) -> StorageResult<Option<RevisionId>> {
        let head = match repo.head() {
            Ok(head) => head,
            Err(e)
                if e.code() == git2::ErrorCode::UnbornBranch
                    || e.code() == git2::ErrorCode::NotFound =>
            {
                return Ok(None)
            }
            Err(e) => return Err(StorageError::Git(e)),
        };

        let commit = head.peel_to_commit()?;
        Ok(Some(RevisionId::new(commit.id())))
    }

    /// Resolve a full or abbreviated revision to a commit id.
    pub fn resolve_revision(repo: &Repository, spec: &str) -> StorageResult<RevisionId> {
        let object = repo
            .revparse_single(spec)
            .map_err(|_| StorageError::RevisionNotFound(spec.to_string()))?;
        let commit = object
            .peel_to_commit()
            .map_err(|_| StorageError::RevisionNotFound(spec.to_string()))?;
        Ok(RevisionId::new(commit.id()))
    }
}
