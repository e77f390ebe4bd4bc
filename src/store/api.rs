//! Page store API - the interface callers use to read and write pages.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::page::{Log, Page, PageTitle};
use crate::storage::{HistoryIter, StorageResult, WikiRepository};
use crate::store::config::StoreConfig;
use crate::store::error::{StoreError, StoreResult};
use crate::store::lock::RootLocks;

/// Result of [`PageStore::load`].
///
/// The document is the primary value, so a failed history lookup doesn't fail
/// the load. It leaves `page.log` empty and is reported in `history_error`.
#[derive(Debug)]
pub struct Loaded {
    pub page: Page,
    pub history_error: Option<StoreError>,
}

impl Loaded {
    /// true when the page came back without its history
    pub fn is_degraded(&self) -> bool {
        self.history_error.is_some()
    }

    pub fn into_page(self) -> Page {
        self.page
    }
}

/// The versioned page store.
///
/// Holds no repository: every operation takes the handle it should act on.
/// Mutations on one repository root are serialized; reads share the lock.
/// The locks belong to this value, so one store per root is expected within
/// a process; share it (`Arc` or a reference) instead of building another.
pub struct PageStore {
    config: StoreConfig,
    locks: RootLocks,
}

impl PageStore {
    /// Create a store with the given configuration.
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            locks: RootLocks::default(),
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Initialize the configured root as a new repository.
    pub fn init_repository(&self) -> StoreResult<WikiRepository> {
        Ok(WikiRepository::init(&self.config.root)?)
    }

    /// Open a handle on the configured root.
    pub fn open_repository(&self) -> StoreResult<WikiRepository> {
        Ok(WikiRepository::open(&self.config.root)?)
    }

    // ==================== Writes ====================

    /// Create or overwrite a page and commit it.
    ///
    /// A blank or missing message becomes `Page <title> saved.`. The returned
    /// page's log holds just the new entry. If the commit fails the written
    /// file stays on disk unless rollback is enabled.
    pub fn save(
        &self,
        title: &str,
        document: &str,
        message: Option<&str>,
        repo: &WikiRepository,
    ) -> StoreResult<Page> {
        let title = PageTitle::new(title)?;
        let file_name = title.file_name();
        let path = repo.root().join(&file_name);
        let message = message
            .filter(|m| !m.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Page {} saved.", title));

        let lock = self.locks.for_root(repo.root());
        let _guard = lock.write();

        let snapshot = self.snapshot(&path)?;
        fs::write(&path, document).map_err(|e| StoreError::io(&path, e))?;

        let entry = match repo.commit_file(&file_name, &message, &self.config.author) {
            Ok(entry) => entry,
            Err(e) => {
                self.restore(snapshot, &path);
                return Err(e.into());
            }
        };

        info!(title = %title, revision = %entry.id, "page saved");
        let mut page = Page::new(title.into_string(), document);
        page.record_entry(entry);
        Ok(page)
    }

    /// Delete a page file and commit the deletion.
    pub fn remove(&self, title: &str, repo: &WikiRepository) -> StoreResult<()> {
        let title = PageTitle::new(title)?;
        let file_name = title.file_name();
        let path = repo.root().join(&file_name);

        let lock = self.locks.for_root(repo.root());
        let _guard = lock.write();

        let snapshot = self.snapshot(&path)?;
        fs::remove_file(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => StoreError::NotFound(title.to_string()),
            _ => StoreError::io(&path, e),
        })?;

        let message = format!("Page {} removed.", title);
        if let Err(e) = repo.commit_file(&file_name, &message, &self.config.author) {
            self.restore(snapshot, &path);
            return Err(e.into());
        }

        info!(title = %title, "page removed");
        Ok(())
    }

    // ==================== Reads ====================

    /// Read a page and its history.
    pub fn load(&self, title: &str, repo: &WikiRepository) -> StoreResult<Loaded> {
        let title = PageTitle::new(title)?;
        let file_name = title.file_name();
        let path = repo.root().join(&file_name);

        let lock = self.locks.for_root(repo.root());
        let _guard = lock.read();

        let document = read_page(&path, &title)?;
        let mut page = Page::new(title.as_str(), document);

        let history_error = match collect(repo.file_history(&file_name)) {
            Ok(log) => {
                page.set_log(log);
                None
            }
            Err(e) => {
                warn!(title = %title, error = %e, "page loaded without history");
                Some(e.into())
            }
        };

        Ok(Loaded {
            page,
            history_error,
        })
    }

    /// Read a page as it was at `revision` (full or abbreviated commit id).
    ///
    /// The log only holds changes up to and including that revision.
    pub fn load_at(&self, title: &str, revision: &str, repo: &WikiRepository) -> StoreResult<Page> {
        let title = PageTitle::new(title)?;
        let file_name = title.file_name();

        let lock = self.locks.for_root(repo.root());
        let _guard = lock.read();

        let rev = repo.resolve_revision(revision)?;
        let document = repo
            .read_file_at(rev, &file_name)?
            .ok_or_else(|| StoreError::NotFound(title.to_string()))?;

        let mut page = Page::new(title.as_str(), document);
        page.set_log(collect(repo.file_history_at(rev, &file_name))?);
        debug!(title = %title, revision = %rev.short(), "loaded page revision");
        Ok(page)
    }

    /// Per-page history. A page that never existed has an empty history.
    pub fn history(&self, title: &str, repo: &WikiRepository) -> StoreResult<Log> {
        let title = PageTitle::new(title)?;

        let lock = self.locks.for_root(repo.root());
        let _guard = lock.read();

        Ok(collect(repo.file_history(&title.file_name()))?)
    }

    /// Whole-repository change feed, most recent first.
    pub fn repository_log(&self, repo: &WikiRepository) -> StoreResult<Log> {
        let lock = self.locks.for_root(repo.root());
        let _guard = lock.read();

        Ok(collect(repo.head_history())?)
    }

    /// Titles of all page files directly under `root`.
    ///
    /// Other files and directories are skipped.
    pub fn list_titles(&self, root: impl AsRef<Path>) -> StoreResult<BTreeSet<String>> {
        let root = root.as_ref();
        let entries = fs::read_dir(root).map_err(|e| StoreError::io(root, e))?;

        let mut titles = BTreeSet::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(root, e))?;
            let file_type = entry.file_type().map_err(|e| StoreError::io(entry.path(), e))?;
            if !file_type.is_file() {
                continue;
            }

            let name = entry.file_name();
            if let Some(title) = name.to_str().and_then(PageTitle::from_file_name) {
                titles.insert(title.into_string());
            }
        }

        Ok(titles)
    }

    // ==================== Rollback ====================

    fn snapshot(&self, path: &Path) -> StoreResult<Option<Snapshot>> {
        if !self.config.rollback_on_commit_failure {
            return Ok(None);
        }
        Snapshot::take(path).map(Some)
    }

    fn restore(&self, snapshot: Option<Snapshot>, path: &Path) {
        let Some(snapshot) = snapshot else {
            warn!(path = %path.display(), "commit failed, working tree left ahead of history");
            return;
        };

        match snapshot.restore() {
            Ok(()) => warn!(path = %path.display(), "commit failed, file rolled back"),
            Err(e) => warn!(path = %path.display(), error = %e, "commit failed and rollback failed"),
        }
    }
}

/// Previous state of a page file, taken before a mutation.
struct Snapshot {
    path: PathBuf,
    content: Option<Vec<u8>>,
}

impl Snapshot {
    fn take(path: &Path) -> StoreResult<Self> {
        let content = match fs::read(path) {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(StoreError::io(path, e)),
        };
        Ok(Self {
            path: path.to_path_buf(),
            content,
        })
    }

    fn restore(self) -> io::Result<()> {
        match self.content {
            Some(bytes) => fs::write(&self.path, bytes),
            None => match fs::remove_file(&self.path) {
                Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
                _ => Ok(()),
            },
        }
    }
}

fn read_page(path: &Path, title: &PageTitle) -> StoreResult<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => StoreError::NotFound(title.to_string()),
        _ => StoreError::io(path, e),
    })
}

fn collect(history: StorageResult<HistoryIter>) -> StorageResult<Log> {
    history?.collect()
}
