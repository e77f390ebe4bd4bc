//! Core Git repository wrapper.
//!
//! This is the central component of the storage layer. It wraps
//! `git2::Repository` with thread-safe access and provides the operations the
//! page store is built from: init/open, single-file commits, and history.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use git2::Repository;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::page::LogEntry;
use crate::storage::commit::{self, CommitBuilder};
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::history::HistoryIter;
use crate::storage::refs::RefManager;
use crate::storage::types::{Author, RevisionId};

/// Handle to a wiki repository rooted at one directory.
///
/// Clone this to share across threads - it uses Arc internally. Every access
/// to the underlying git2 repository goes through one mutex.
#[derive(Clone)]
pub struct WikiRepository {
    inner: Arc<WikiRepositoryInner>,
}

struct WikiRepositoryInner {
    repo: Mutex<Repository>,
    root: PathBuf,
    git_dir: PathBuf,
}

impl WikiRepository {
    /// Initialize a new repository at `root`, creating the directory if needed.
    ///
    /// Fails if `root` already holds repository metadata. The new repository
    /// has no commits.
    pub fn init(root: impl AsRef<Path>) -> StorageResult<Self> {
        let root = root.as_ref();
        if root.join(".git").exists() {
            return Err(StorageError::AlreadyInitialized(root.to_path_buf()));
        }

        fs::create_dir_all(root)?;
        let repo = Repository::init(root)?;
        info!(root = %root.display(), "initialized wiki repository");

        Self::from_git2(repo, root)
    }

    /// Open an existing repository rooted exactly at `root`.
    pub fn open(root: impl AsRef<Path>) -> StorageResult<Self> {
        let root = root.as_ref();
        if !root.join(".git").exists() {
            return Err(StorageError::NotInitialized(root.to_path_buf()));
        }

        let repo = Repository::open(root).map_err(|_| StorageError::NotInitialized(root.to_path_buf()))?;
        Self::from_git2(repo, root)
    }

    fn from_git2(repo: Repository, root: &Path) -> StorageResult<Self> {
        let workdir = repo
            .workdir()
            .ok_or_else(|| StorageError::NotInitialized(root.to_path_buf()))?;
        let root = fs::canonicalize(workdir)?;
        let git_dir = repo.path().to_path_buf();

        Ok(Self {
            inner: Arc::new(WikiRepositoryInner {
                repo: Mutex::new(repo),
                root,
                git_dir,
            }),
        })
    }

    /// The canonical working tree root (where page files live).
    pub fn root(&self) -> &Path {
        &self.inner.root
    }

    /// Fails once the metadata under this handle has disappeared.
    fn ensure_live(&self) -> StorageResult<()> {
        if self.inner.git_dir.is_dir() {
            Ok(())
        } else {
            Err(StorageError::NotInitialized(self.inner.root.clone()))
        }
    }

    /// Execute a function with exclusive access to the repository.
    pub fn with_repo<F, T>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&Repository) -> StorageResult<T>,
    {
        self.ensure_live()?;
        let repo = self.inner.repo.lock();
        f(&repo)
    }

    // ==================== Commits ====================

    /// Get the current HEAD commit, None before the first commit.
    pub fn head(&self) -> StorageResult<Option<RevisionId>> {
        self.with_repo(RefManager::head_commit)
    }

    /// Record the current working tree state of one file as a new commit.
    ///
    /// The file must already hold its final content; a file missing from the
    /// working tree is recorded as deleted. The new tree is HEAD's tree with
    /// only that file changed, so a failed attempt leaves nothing behind for
    /// the next commit to pick up. Anything going wrong past the liveness
    /// check is reported as `CommitFailed`.
    pub fn commit_file(&self, file_name: &str, message: &str, author: &Author) -> StorageResult<LogEntry> {
        if author.is_incomplete() {
            return Err(StorageError::commit_failed(file_name, "missing author identity"));
        }

        self.with_repo(|repo| {
            self.record(repo, file_name, message, author).map_err(|e| match e {
                StorageError::CommitFailed { .. } => e,
                other => StorageError::commit_failed(file_name, other),
            })
        })
    }

    fn record(&self, repo: &Repository, file_name: &str, message: &str, author: &Author) -> StorageResult<LogEntry> {
        let parent = RefManager::head_commit(repo)?;
        let seconds = commit::next_commit_seconds(repo, parent)?;
        // reject identities git can't encode before any object is written
        author.to_git2_signature(seconds)?;

        let tree_id = commit::tree_with_file(repo, &self.inner.root, file_name, parent)?;
        let mut builder = CommitBuilder::new(repo)
            .tree(tree_id)
            .message(message)
            .author(author.clone())
            .time(seconds)
            .update_ref("HEAD");
        if let Some(parent) = parent {
            builder = builder.parent(parent);
        }
        let id = builder.commit()?;

        if let Err(e) = commit::sync_index(repo, id) {
            warn!(revision = %id.short(), error = %e, "commit recorded but index not refreshed");
        }

        let commit = repo.find_commit(id.raw())?;
        info!(file = file_name, revision = %id.short(), "committed");
        Ok(commit::log_entry(&commit))
    }

    // ==================== History ====================

    /// Whole-repository history from HEAD, most recent first.
    pub fn head_history(&self) -> StorageResult<HistoryIter> {
        let start = self.head()?;
        debug!(start = ?start.map(|id| id.short()), "walking repository history");
        Ok(HistoryIter::new(self.clone(), start.map(|id| id.raw()), None))
    }

    /// History of commits that changed `file_name`, most recent first.
    pub fn file_history(&self, file_name: &str) -> StorageResult<HistoryIter> {
        let start = self.head()?;
        self.file_history_from(start, file_name)
    }

    /// History of `file_name` as seen from `revision` backwards.
    pub fn file_history_at(&self, revision: RevisionId, file_name: &str) -> StorageResult<HistoryIter> {
        self.file_history_from(Some(revision), file_name)
    }

    fn file_history_from(&self, start: Option<RevisionId>, file_name: &str) -> StorageResult<HistoryIter> {
        debug!(file = file_name, start = ?start.map(|id| id.short()), "walking file history");
        Ok(HistoryIter::new(
            self.clone(),
            start.map(|id| id.raw()),
            Some(file_name.to_string()),
        ))
    }

    // ==================== Revisions ====================

    /// Resolve a full or abbreviated commit id.
    pub fn resolve_revision(&self, spec: &str) -> StorageResult<RevisionId> {
        self.with_repo(|repo| RefManager::resolve_revision(repo, spec))
    }

    /// Content of `file_name` at `revision`, None if the file wasn't there.
    pub fn read_file_at(&self, revision: RevisionId, file_name: &str) -> StorageResult<Option<String>> {
        self.with_repo(|repo| commit::read_file_at(repo, revision, file_name))
    }
}

impl std::fmt::Debug for WikiRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WikiRepository")
            .field("root", &self.inner.root)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, WikiRepository) {
        let dir = TempDir::new().unwrap();
        let repo = WikiRepository::init(dir.path()).unwrap();
        (dir, repo)
    }

    fn author() -> Author {
        Author::new("John Doe", "john@doe.com")
    }

    #[test]
    fn test_init_and_open() {
        let dir = TempDir::new().unwrap();

        let repo = WikiRepository::init(dir.path()).unwrap();
        assert_eq!(repo.head().unwrap(), None);
        drop(repo);

        let repo = WikiRepository::open(dir.path()).unwrap();
        assert_eq!(repo.root(), fs::canonicalize(dir.path()).unwrap());
    }

    #[test]
    fn test_init_twice_fails() {
        let (dir, _repo) = setup();
        let result = WikiRepository::init(dir.path());
        assert!(matches!(result, Err(StorageError::AlreadyInitialized(_))));
    }

    #[test]
    fn test_init_creates_missing_root() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("nested").join("wiki");
        let repo = WikiRepository::init(&root).unwrap();
        assert!(root.join(".git").is_dir());
        assert!(repo.head_history().unwrap().next().is_none());
    }

    #[test]
    fn test_open_missing_fails() {
        let dir = TempDir::new().unwrap();
        let result = WikiRepository::open(dir.path());
        assert!(matches!(result, Err(StorageError::NotInitialized(_))));

        // a plain subdirectory of a repository is not a repository root
        WikiRepository::init(dir.path()).unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        assert!(matches!(
            WikiRepository::open(&sub),
            Err(StorageError::NotInitialized(_))
        ));
    }

    #[test]
    fn test_commit_file_returns_entry() {
        let (_dir, repo) = setup();
        fs::write(repo.root().join("index.wiki"), "hello").unwrap();

        let entry = repo.commit_file("index.wiki", "init", &author()).unwrap();
        assert_eq!(entry.message, "init");
        assert_eq!(entry.id.len(), 40);
        assert_eq!(repo.head().unwrap().unwrap().to_string(), entry.id);

        let first = repo.head_history().unwrap().next().unwrap().unwrap();
        assert_eq!(first, entry);
    }

    #[test]
    fn test_commit_without_author_fails() {
        let (_dir, repo) = setup();
        fs::write(repo.root().join("index.wiki"), "hello").unwrap();

        let result = repo.commit_file("index.wiki", "init", &Author::new("", ""));
        assert!(matches!(result, Err(StorageError::CommitFailed { .. })));
        assert_eq!(repo.head().unwrap(), None);
    }

    #[test]
    fn test_failed_commit_leaves_nothing_staged() {
        let (_dir, repo) = setup();
        fs::write(repo.root().join("index.wiki"), "hello").unwrap();
        repo.commit_file("index.wiki", "init", &author()).unwrap();

        // git refuses angle brackets in identities
        let bad = Author::new("bad<name", "bad@host");
        fs::write(repo.root().join("secret.wiki"), "leaked").unwrap();
        let result = repo.commit_file("secret.wiki", "secret", &bad);
        assert!(matches!(result, Err(StorageError::CommitFailed { .. })));
        fs::remove_file(repo.root().join("secret.wiki")).unwrap();

        fs::write(repo.root().join("other.wiki"), "other").unwrap();
        let entry = repo.commit_file("other.wiki", "other only", &author()).unwrap();

        let head = repo.resolve_revision(&entry.id).unwrap();
        assert_eq!(repo.read_file_at(head, "secret.wiki").unwrap(), None);
        assert_eq!(
            repo.read_file_at(head, "index.wiki").unwrap().as_deref(),
            Some("hello")
        );
        assert_eq!(repo.file_history("secret.wiki").unwrap().count(), 0);
        assert_eq!(repo.file_history("index.wiki").unwrap().count(), 1);
    }

    #[test]
    fn test_stale_handle() {
        let (_dir, repo) = setup();
        fs::remove_dir_all(repo.root().join(".git")).unwrap();

        assert!(matches!(repo.head(), Err(StorageError::NotInitialized(_))));
        assert!(matches!(
            repo.commit_file("index.wiki", "init", &author()),
            Err(StorageError::NotInitialized(_))
        ));
        assert!(matches!(
            repo.head_history(),
            Err(StorageError::NotInitialized(_))
        ));
    }

    #[test]
    fn test_history_dates_non_increasing() {
        let (_dir, repo) = setup();
        for i in 0..4 {
            fs::write(repo.root().join("index.wiki"), format!("v{}", i)).unwrap();
            repo.commit_file("index.wiki", &format!("v{}", i), &author()).unwrap();
        }

        let entries: Vec<LogEntry> = repo
            .file_history("index.wiki")
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(entries.len(), 4);
        assert!(entries.windows(2).all(|w| w[0].date >= w[1].date));
    }

    #[test]
    fn test_read_file_at_revision() {
        let (_dir, repo) = setup();
        fs::write(repo.root().join("index.wiki"), "one").unwrap();
        let first = repo.commit_file("index.wiki", "one", &author()).unwrap();
        fs::write(repo.root().join("index.wiki"), "two").unwrap();
        repo.commit_file("index.wiki", "two", &author()).unwrap();

        let rev = repo.resolve_revision(&first.id[..10]).unwrap();
        assert_eq!(rev.to_string(), first.id);
        assert_eq!(
            repo.read_file_at(rev, "index.wiki").unwrap().as_deref(),
            Some("one")
        );
        assert_eq!(repo.file_history_at(rev, "index.wiki").unwrap().count(), 1);
    }
}
