//! Versioned page store.
//!
//! Every mutation is one file operation under the wiki root followed by one
//! commit of that file. Reads take the document from disk and the log from
//! the repository, filtered to the page's file.
//!
//! # Usage
//!
//! ```ignore
//! use gitwiki::store::{PageStore, StoreConfig};
//!
//! let store = PageStore::new(StoreConfig::from_env()?);
//! let repo = store.open_repository()?;
//!
//! store.save("index", "hello", Some("init"), &repo)?;
//! let page = store.load("index", &repo)?.into_page();
//! assert_eq!(page.log[0].message, "init");
//! ```
//!
//! # Consistency
//!
//! Writing the file and committing it are two steps. When the commit fails
//! the file is left as written and the error is `CommitFailed`; callers that
//! want the file put back enable `rollback_on_commit_failure`.

mod api;
mod config;
mod error;
mod lock;

pub use api::{Loaded, PageStore};
pub use config::{StoreConfig, ENV_AUTHOR_EMAIL, ENV_AUTHOR_NAME, ENV_ROOT};
pub use error::{ErrorKind, StoreError, StoreResult};
