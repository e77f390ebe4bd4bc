//! Page entity and its wire codec.
//!
//! A [`Page`] is built fresh for every store operation: the document comes
//! from the page file and the log from the repository. Nothing here touches
//! the disk.

mod codec;
mod entity;
mod title;

pub use codec::{log_to_json, CodecError};
pub use entity::{Log, LogEntry, Page};
pub use title::{InvalidTitleError, PageTitle};
