//! In-memory page representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::page::codec;

/// One recorded change of the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// commit id, 40 hex characters
    pub id: String,
    pub message: String,
    pub date: DateTime<Utc>,
}

/// Change history, most recent entry first.
pub type Log = Vec<LogEntry>;

/// A single wiki page.
///
/// `updated` and `message` mirror the newest entry in `log` so clients can
/// show "last changed" without walking the log. Neither is stored anywhere;
/// both are recomputed whenever the log is replaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub title: String,
    pub document: String,
    #[serde(default, deserialize_with = "codec::lenient_timestamp")]
    pub updated: DateTime<Utc>,
    #[serde(default)]
    pub message: String,
    #[serde(default, deserialize_with = "codec::nullable_log")]
    pub log: Log,
}

impl Page {
    /// creates a page with an empty log
    pub fn new(title: impl Into<String>, document: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            document: document.into(),
            updated: DateTime::<Utc>::default(),
            message: String::new(),
            log: Log::new(),
        }
    }

    /// record a fresh change at the head of the log
    pub fn record_entry(&mut self, entry: LogEntry) {
        self.log.insert(0, entry);
        self.sync_header();
    }

    /// replace the whole log (expected most recent first)
    pub fn set_log(&mut self, log: Log) {
        self.log = log;
        self.sync_header();
    }

    /// the newest change, if any
    pub fn latest(&self) -> Option<&LogEntry> {
        self.log.first()
    }

    fn sync_header(&mut self) {
        match self.log.first() {
            Some(entry) => {
                self.updated = entry.date;
                self.message = entry.message.clone();
            }
            None => {
                self.updated = DateTime::<Utc>::default();
                self.message.clear();
            }
        }
    }
}
