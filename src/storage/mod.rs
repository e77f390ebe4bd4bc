//! storage layer for gitwiki
//!
//! this module is the only place that talks to git. The page store uses this
//! API and never touches git2 directly.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     WikiRepository                          │
//! │   (handle: init/open, commit one file, history, revisions)  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!        ┌─────────────────────┼─────────────────────┐
//!        │                     │                     │
//!        ▼                     ▼                     ▼
//!  ┌─────────────┐       ┌─────────────┐       ┌─────────────┐
//!  │   commit    │       │   history   │       │    refs     │
//!  │ (stage+rec) │       │ (lazy walk) │       │   (HEAD)    │
//!  └─────────────┘       └─────────────┘       └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use gitwiki::storage::{Author, WikiRepository};
//!
//! let repo = WikiRepository::init("./wiki")?;
//! std::fs::write(repo.root().join("index.wiki"), "hello")?;
//! repo.commit_file("index.wiki", "init", &Author::new("me", "me@host"))?;
//!
//! for entry in repo.file_history("index.wiki")? {
//!     let entry = entry?;
//!     println!("{} {}", entry.id, entry.message);
//! }
//! ```

mod commit;
mod error;
mod history;
mod refs;
mod repository;
mod types;

// Re-export public API
pub use commit::CommitBuilder;
pub use error::{StorageError, StorageResult};
pub use history::HistoryIter;
pub use repository::WikiRepository;
pub use types::{Author, RevisionId};
