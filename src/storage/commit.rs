//! Commit creation and per-commit inspection
//!
//! every page write is recorded as exactly one commit on top of HEAD. this
//! module builds the tree for a single-file change, builds the commit and
//! projects commits into log entries.

use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use git2::{ErrorCode, FileMode, ObjectType, Oid, Repository};

use crate::page::LogEntry;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::types::{Author, RevisionId};

/// project a git2::Commit into a LogEntry
pub(crate) fn log_entry(commit: &git2::Commit<'_>) -> LogEntry {
    LogEntry {
        id: commit.id().to_string(),
        message: commit.message().unwrap_or("").to_string(),
        date: commit_date(commit),
    }
}

fn commit_date(commit: &git2::Commit<'_>) -> DateTime<Utc> {
    Utc.timestamp_opt(commit.time().seconds(), 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// builder for creating commits with a fluent interface
pub struct CommitBuilder<'a> {
    repo: &'a Repository,
    tree_id: Option<Oid>,
    parents: Vec<RevisionId>,
    message: String,
    author: Option<Author>,
    seconds: Option<i64>,
    update_ref: Option<String>,
}

impl<'a> CommitBuilder<'a> {
    pub fn new(repo: &'a Repository) -> Self {
        Self {
            repo,
            tree_id: None,
            parents: Vec::new(),
            message: String::new(),
            author: None,
            seconds: None,
            update_ref: None,
        }
    }

    /// set the tree for this commit
    pub fn tree(mut self, tree_id: Oid) -> Self {
        self.tree_id = Some(tree_id);
        self
    }

    /// add a parent commit
    pub fn parent(mut self, parent: RevisionId) -> Self {
        self.parents.push(parent);
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// set the author/committer identity
    pub fn author(mut self, author: Author) -> Self {
        self.author = Some(author);
        self
    }

    /// unix time recorded on the commit (defaults to now)
    pub fn time(mut self, seconds: i64) -> Self {
        self.seconds = Some(seconds);
        self
    }

    /// update a ref (usually HEAD) to point to this commit
    pub fn update_ref(mut self, refname: impl Into<String>) -> Self {
        self.update_ref = Some(refname.into());
        self
    }

    /// create the commit and return its ID
    pub fn commit(self) -> StorageResult<RevisionId> {
        let tree_id = self
            .tree_id
            .ok_or_else(|| StorageError::commit_failed("<tree>", "commit requires a tree"))?;
        let author = self
            .author
            .ok_or_else(|| StorageError::commit_failed("<tree>", "commit requires an author"))?;

        let tree = self.repo.find_tree(tree_id)?;
        let seconds = self.seconds.unwrap_or_else(|| Utc::now().timestamp());
        let sig = author.to_git2_signature(seconds)?;

        let parent_commits: Vec<git2::Commit<'_>> = self
            .parents
            .iter()
            .map(|id| self.repo.find_commit(id.raw()))
            .collect::<Result<_, _>>()?;
        let parent_refs: Vec<&git2::Commit<'_>> = parent_commits.iter().collect();

        let oid = self.repo.commit(
            self.update_ref.as_deref(),
            &sig,
            &sig,
            &self.message,
            &tree,
            &parent_refs,
        )?;

        Ok(RevisionId::new(oid))
    }
}

/// commit time for a child of `parent`: the wall clock, but never earlier
/// than the parent so history dates stay non-increasing from the tip
pub(crate) fn next_commit_seconds(repo: &Repository, parent: Option<RevisionId>) -> StorageResult<i64> {
    let now = Utc::now().timestamp();
    match parent {
        Some(parent) => {
            let parent = repo.find_commit(parent.raw())?;
            Ok(now.max(parent.time().seconds()))
        }
        None => Ok(now),
    }
}

/// tree of `parent` with exactly one file replaced by its working tree state
///
/// a file that is missing from the working tree is dropped from the tree,
/// which is how deletions get recorded. Only object storage is written: the
/// repository index is left alone until the commit exists.
pub(crate) fn tree_with_file(
    repo: &Repository,
    workdir: &Path,
    file_name: &str,
    parent: Option<RevisionId>,
) -> StorageResult<Oid> {
    let base = match parent {
        Some(parent) => Some(repo.find_commit(parent.raw())?.tree()?),
        None => None,
    };
    let mut builder = repo.treebuilder(base.as_ref())?;

    let path = workdir.join(file_name);
    if path.is_file() {
        tracing::debug!(file = file_name, "staging file");
        let blob_id = repo.blob_path(&path)?;
        builder.insert(file_name, blob_id, FileMode::Blob.into())?;
    } else if builder.get(file_name)?.is_some() {
        tracing::debug!(file = file_name, "staging removal");
        builder.remove(file_name)?;
    }

    Ok(builder.write()?)
}

/// reset the repository index to the tree of a freshly created commit
pub(crate) fn sync_index(repo: &Repository, rev: RevisionId) -> StorageResult<()> {
    let tree = repo.find_commit(rev.raw())?.tree()?;
    let mut index = repo.index()?;
    index.read_tree(&tree)?;
    index.write()?;
    Ok(())
}

/// blob id of `file_name` in the commit's tree, None when absent
pub(crate) fn entry_id(commit: &git2::Commit<'_>, file_name: &str) -> Result<Option<Oid>, git2::Error> {
    let tree = commit.tree()?;
    match tree.get_path(Path::new(file_name)) {
        Ok(entry) => Ok(Some(entry.id())),
        Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// read a file's content as of a revision
pub(crate) fn read_file_at(repo: &Repository, rev: RevisionId, file_name: &str) -> StorageResult<Option<String>> {
    let commit = repo
        .find_commit(rev.raw())
        .map_err(|_| StorageError::RevisionNotFound(rev.to_string()))?;
    let tree = commit.tree()?;

    let entry = match tree.get_path(Path::new(file_name)) {
        Ok(entry) => entry,
        Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
        Err(e) => return Err(StorageError::Git(e)),
    };
    if entry.kind() != Some(ObjectType::Blob) {
        return Ok(None);
    }

    let blob = repo.find_blob(entry.id())?;
    String::from_utf8(blob.content().to_vec())
        .map(Some)
        .map_err(|_| StorageError::InvalidUtf8 {
            file: file_name.to_string(),
        })
}
