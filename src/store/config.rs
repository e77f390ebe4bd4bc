//! Page store configuration.

use std::path::PathBuf;

use crate::storage::Author;
use crate::store::error::{StoreError, StoreResult};

/// Environment variable holding the wiki root.
pub const ENV_ROOT: &str = "WIKIPATH";
/// Environment variable holding the commit author name.
pub const ENV_AUTHOR_NAME: &str = "GIT_USERNAME";
/// Environment variable holding the commit author email.
pub const ENV_AUTHOR_EMAIL: &str = "GIT_EMAIL";

/// Page store configuration options.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding the page files and `.git`.
    pub root: PathBuf,
    /// Identity recorded on every commit.
    pub author: Author,
    /// Undo the file write when its commit fails.
    pub rollback_on_commit_failure: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("wiki"),
            author: Author::new("", ""),
            rollback_on_commit_failure: false,
        }
    }
}

impl StoreConfig {
    /// Create a new configuration with the given root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Read `WIKIPATH`, `GIT_USERNAME` and `GIT_EMAIL`.
    pub fn from_env() -> StoreResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. The root is mandatory; a missing author is
    /// left blank and surfaces later as a failed commit.
    pub fn from_lookup<F>(lookup: F) -> StoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let root = lookup(ENV_ROOT)
            .filter(|root| !root.trim().is_empty())
            .ok_or_else(|| StoreError::InvalidConfig(format!("{} is not set", ENV_ROOT)))?;

        Ok(Self::new(root).author(
            lookup(ENV_AUTHOR_NAME).unwrap_or_default(),
            lookup(ENV_AUTHOR_EMAIL).unwrap_or_default(),
        ))
    }

    /// Set the commit author.
    pub fn author(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.author = Author::new(name, email);
        self
    }

    /// Set rollback_on_commit_failure flag.
    pub fn rollback_on_commit_failure(mut self, value: bool) -> Self {
        self.rollback_on_commit_failure = value;
        self
    }
}
