//! JSON wire format for pages and logs.
//!
//! ```text
//! Page     = { title, document, updated, message, log }
//! LogEntry = { id, message, date }
//! ```
//!
//! Timestamps are RFC 3339. `log` is always emitted, possibly as `[]`.
//! Decoding is lenient about fields clients tend to leave blank; only a
//! missing or non-string `document` and malformed JSON are rejected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::page::entity::{Log, LogEntry, Page};

/// errors raised while mapping to or from the wire format
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed page payload: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("failed to encode {what}: {source}")]
    Encode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl Page {
    /// encode this page as JSON bytes
    pub fn to_json(&self) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(self).map_err(|source| CodecError::Encode { what: "page", source })
    }

    /// decode a page from caller supplied JSON bytes
    pub fn from_json(bytes: &[u8]) -> Result<Self, CodecError> {
        serde_json::from_slice(bytes).map_err(CodecError::Decode)
    }
}

/// encode a bare log (the history feeds)
pub fn log_to_json(log: &[LogEntry]) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(log).map_err(|source| CodecError::Encode { what: "log", source })
}

/// accepts RFC 3339, `null`, or the empty string (sent by older clients)
pub(crate) fn lenient_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(DateTime::<Utc>::default()),
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom),
    }
}

/// `null` decodes as an empty log
pub(crate) fn nullable_log<'de, D>(deserializer: D) -> Result<Log, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Log>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::Value;

    #[test]
    fn test_encode_field_contract() {
        let mut page = Page::new("index", "hello");
        page.record_entry(LogEntry {
            id: "0123456789abcdef0123456789abcdef01234567".into(),
            message: "init".into(),
            date: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        });

        let json: Value = serde_json::from_slice(&page.to_json().unwrap()).unwrap();
        assert_eq!(json["title"], "index");
        assert_eq!(json["document"], "hello");
        assert_eq!(json["message"], "init");
        assert_eq!(json["updated"], "2024-05-01T12:00:00Z");
        assert_eq!(json["log"][0]["id"], "0123456789abcdef0123456789abcdef01234567");
        assert_eq!(json["log"][0]["date"], "2024-05-01T12:00:00Z");
        assert_eq!(json.as_object().unwrap().len(), 5);
    }

    #[test]
    fn test_empty_log_is_array() {
        let page = Page::new("index", "hello");
        let json: Value = serde_json::from_slice(&page.to_json().unwrap()).unwrap();
        assert_eq!(json["log"], Value::Array(vec![]));
    }

    #[test]
    fn test_decode_legacy_payload() {
        let page =
            Page::from_json(br#"{"title":"test_index 2","document":"index2","updated":""}"#)
                .unwrap();
        assert_eq!(page.title, "test_index 2");
        assert_eq!(page.document, "index2");
        assert_eq!(page.updated.timestamp(), 0);
        assert!(page.log.is_empty());
    }

    #[test]
    fn test_decode_null_log_and_offset_date() {
        let page = Page::from_json(
            br#"{"document":"x","updated":"2024-05-01T14:00:00+02:00","log":null}"#,
        )
        .unwrap();
        assert_eq!(page.updated, Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
        assert!(page.log.is_empty());
        assert!(page.title.is_empty());
    }

    #[test]
    fn test_decode_failures() {
        assert!(matches!(Page::from_json(b"{not json"), Err(CodecError::Decode(_))));
        assert!(Page::from_json(br#"{"title":"index"}"#).is_err());
        assert!(Page::from_json(br#"{"document":42}"#).is_err());
        assert!(Page::from_json(br#"{"document":"x","updated":"yesterday"}"#).is_err());
    }

    #[test]
    fn test_log_to_json() {
        let bytes = log_to_json(&[]).unwrap();
        assert_eq!(bytes, b"[]");
    }
}
