//! Per-root writer locks.
//!
//! A commit records the working tree file on top of the current HEAD, so two
//! handles on the same root must never interleave a write-then-commit
//! sequence. Locks are keyed by canonical root and live inside the store
//! value that hands them out.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

#[derive(Default)]
pub(crate) struct RootLocks {
    locks: Mutex<HashMap<PathBuf, Arc<RwLock<()>>>>,
}

impl RootLocks {
    /// The lock guarding `root`, created on first use.
    pub(crate) fn for_root(&self, root: &Path) -> Arc<RwLock<()>> {
        let mut locks = self.locks.lock();
        locks.entry(root.to_path_buf()).or_default().clone()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.locks.lock().len()
    }
}
