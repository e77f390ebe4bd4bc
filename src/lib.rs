//! gitwiki - a Git-backed wiki page store
//!
//! Pages are plain `<title>.wiki` files in one directory, and that directory
//! is a Git repository. Every save and every removal is a commit, so the
//! history of each page (and of the whole wiki) comes straight out of
//! `.git/`.
//!
//! # Example
//!
//! ```no_run
//! use gitwiki::store::{PageStore, StoreConfig};
//!
//! let store = PageStore::new(StoreConfig::new("./wiki").author("Jane", "jane@example.com"));
//! let repo = store.init_repository().unwrap();
//! store.save("index", "Welcome!", Some("first page"), &repo).unwrap();
//! ```

pub mod page;
pub mod storage;
pub mod store;
