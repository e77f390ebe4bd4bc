//! Lazy history traversal.
//!
//! History is never indexed. Every query walks first parents from a start
//! commit (normally HEAD) back to the root, one commit per `next()`. The
//! iterator holds a handle clone and a cursor, not a borrow of the
//! repository, so it can outlive the call that created it. Each step takes
//! the repository lock only for as long as it needs.

use git2::{Oid, Repository};

use crate::page::LogEntry;
use crate::storage::commit;
use crate::storage::error::StorageResult;
use crate::storage::repository::WikiRepository;

/// Iterator over log entries, most recent first.
///
/// Not restartable: once drained (or after the first error) it stays empty.
pub struct HistoryIter {
    repo: WikiRepository,
    next: Option<Oid>,
    path: Option<String>,
}

impl HistoryIter {
    pub(crate) fn new(repo: WikiRepository, start: Option<Oid>, path: Option<String>) -> Self {
        Self {
            repo,
            next: start,
            path,
        }
    }
}

impl Iterator for HistoryIter {
    type Item = StorageResult<LogEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.next.take()?;
        let path = self.path.as_deref();

        match self.repo.with_repo(|repo| step(repo, start, path)) {
            Ok((entry, next)) => {
                self.next = next;
                entry.map(Ok)
            }
            Err(e) => Some(Err(e)),
        }
    }
}

/// walk from `cursor` to the first commit that matches the filter
///
/// returns that commit's entry and the cursor to resume from.
fn step(repo: &Repository, mut cursor: Oid, path: Option<&str>) -> StorageResult<(Option<LogEntry>, Option<Oid>)> {
    loop {
        let commit = repo.find_commit(cursor)?;
        let parent = commit.parents().next();
        let next = parent.as_ref().map(|p| p.id());

        let touched = match path {
            None => true,
            Some(path) => {
                let ours = commit::entry_id(&commit, path)?;
                let theirs = match &parent {
                    Some(parent) => commit::entry_id(parent, path)?,
                    None => None,
                };
                ours != theirs
            }
        };

        if touched {
            return Ok((Some(commit::log_entry(&commit)), next));
        }

        match next {
            Some(oid) => cursor = oid,
            None => return Ok((None, None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use crate::storage::{Author, WikiRepository};

    fn author() -> Author {
        Author::new("John Doe", "john@doe.com")
    }

    fn write_and_commit(repo: &WikiRepository, file: &str, body: &str, message: &str) {
        fs::write(repo.root().join(file), body).unwrap();
        repo.commit_file(file, message, &author()).unwrap();
    }

    #[test]
    fn test_empty_repository_has_no_history() {
        let dir = TempDir::new().unwrap();
        let repo = WikiRepository::init(dir.path()).unwrap();
        assert_eq!(repo.head_history().unwrap().count(), 0);
        assert_eq!(repo.file_history("index.wiki").unwrap().count(), 0);
    }

    #[test]
    fn test_file_filter_skips_other_files() {
        let dir = TempDir::new().unwrap();
        let repo = WikiRepository::init(dir.path()).unwrap();

        write_and_commit(&repo, "a.wiki", "a1", "a one");
        write_and_commit(&repo, "b.wiki", "b1", "b one");
        write_and_commit(&repo, "a.wiki", "a2", "a two");

        let a: Vec<_> = repo
            .file_history("a.wiki")
            .unwrap()
            .map(|e| e.unwrap().message)
            .collect();
        assert_eq!(a, vec!["a two", "a one"]);

        let b: Vec<_> = repo
            .file_history("b.wiki")
            .unwrap()
            .map(|e| e.unwrap().message)
            .collect();
        assert_eq!(b, vec!["b one"]);

        assert_eq!(repo.file_history("nonexistent.wiki").unwrap().count(), 0);
    }

    #[test]
    fn test_deletion_counts_as_touch() {
        let dir = TempDir::new().unwrap();
        let repo = WikiRepository::init(dir.path()).unwrap();

        write_and_commit(&repo, "a.wiki", "a1", "created");
        fs::remove_file(repo.root().join("a.wiki")).unwrap();
        repo.commit_file("a.wiki", "removed", &author()).unwrap();

        let messages: Vec<_> = repo
            .file_history("a.wiki")
            .unwrap()
            .map(|e| e.unwrap().message)
            .collect();
        assert_eq!(messages, vec!["removed", "created"]);
    }

    #[test]
    fn test_iterator_is_lazy_and_not_restartable() {
        let dir = TempDir::new().unwrap();
        let repo = WikiRepository::init(dir.path()).unwrap();
        write_and_commit(&repo, "a.wiki", "1", "first");
        write_and_commit(&repo, "a.wiki", "2", "second");

        let mut history = repo.head_history().unwrap();
        assert_eq!(history.next().unwrap().unwrap().message, "second");

        // commits made mid-walk are not seen by the running traversal
        write_and_commit(&repo, "a.wiki", "3", "third");
        assert_eq!(history.next().unwrap().unwrap().message, "first");
        assert!(history.next().is_none());
        assert!(history.next().is_none());

        assert_eq!(repo.head_history().unwrap().count(), 3);
    }
}
