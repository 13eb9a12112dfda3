//! Log domain types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Record kind used by the log forwarder for plain log lines
pub const DATA_KIND: &str = "data";

/// A single record emitted by the log forwarder
///
/// Unknown fields are ignored and missing fields default to the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogRecord {
    #[serde(rename = "type")]
    pub kind: String,
    pub payload: String,
}

impl LogRecord {
    /// Creates a new record
    pub fn new(kind: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: payload.into(),
        }
    }

    /// Creates a plain `data` record
    pub fn data(payload: impl Into<String>) -> Self {
        Self::new(DATA_KIND, payload)
    }

    /// Whether this record is a plain log line
    pub fn is_data(&self) -> bool {
        self.kind == DATA_KIND
    }

    /// Renders the record as a display line
    ///
    /// `data` records render as their payload verbatim, anything else as
    /// `"<kind> - <payload>"`.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_data() {
            write!(f, "{}", self.payload)
        } else {
            write!(f, "{} - {}", self.kind, self.payload)
        }
    }
}

/// Ordered list of rendered log lines
///
/// Serializes as `{"entries": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntries {
    pub entries: Vec<String>,
}

impl LogEntries {
    pub fn new(entries: Vec<String>) -> Self {
        Self { entries }
    }

    /// An empty result
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.entries.iter()
    }

    pub fn into_inner(self) -> Vec<String> {
        self.entries
    }
}

impl From<Vec<String>> for LogEntries {
    fn from(entries: Vec<String>) -> Self {
        Self::new(entries)
    }
}

impl FromIterator<LogRecord> for LogEntries {
    fn from_iter<I: IntoIterator<Item = LogRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|record| record.render()).collect())
    }
}

impl IntoIterator for LogEntries {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a LogEntries {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_record_renders_payload() {
        let record = LogRecord::data("hello");
        assert_eq!(record.render(), "hello");
    }

    #[test]
    fn test_other_kinds_render_with_prefix() {
        let record = LogRecord::new("warn", "oops");
        assert_eq!(record.render(), "warn - oops");

        let record = LogRecord::new("", "no kind");
        assert_eq!(record.render(), " - no kind");
    }

    #[test]
    fn test_record_ignores_unknown_and_defaults_missing_fields() {
        let record: LogRecord =
            serde_json::from_str(r#"{"payload":"x","extra":42}"#).unwrap();
        assert_eq!(record, LogRecord::new("", "x"));

        let record: LogRecord = serde_json::from_str("{}").unwrap();
        assert_eq!(record, LogRecord::default());
    }

    #[test]
    fn test_entries_serialize_under_entries_key() {
        let entries = LogEntries::new(vec!["a".to_string(), "b".to_string()]);
        let json = serde_json::to_string(&entries).unwrap();
        assert_eq!(json, r#"{"entries":["a","b"]}"#);
    }

    #[test]
    fn test_entries_collect_from_records() {
        let entries: LogEntries = vec![LogRecord::data("one"), LogRecord::new("err", "two")]
            .into_iter()
            .collect();
        assert_eq!(entries.into_inner(), vec!["one", "err - two"]);
    }
}
