//! Log-forwarder envelope
//!
//! The log forwarder answers with a JSON array of strings where every string
//! is itself the JSON encoding of a `{"type": ..., "payload": ...}` object.
//! Decoding therefore happens in two passes: the outer array first, then each
//! element on its own.

use thiserror::Error;

use crate::domain::log::{LogEntries, LogRecord};

/// Body the log forwarder sends when there is nothing to report
pub const NULL_BODY: &str = "null";

/// Errors produced while decoding or encoding an envelope
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// The body is not a JSON array of strings
    #[error("cannot unmarshal structure: {0}")]
    OuterArray(#[source] serde_json::Error),

    /// One element of the array is not a JSON-encoded record
    #[error("cannot unmarshal structure: entry {index}: {source}")]
    Entry {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    /// A record could not be encoded
    #[error("cannot marshal structure: {0}")]
    Encode(#[source] serde_json::Error),
}

impl EnvelopeError {
    /// Whether this error came from decoding a body
    pub fn is_unmarshal(&self) -> bool {
        matches!(self, Self::OuterArray(_) | Self::Entry { .. })
    }
}

pub type Result<T> = std::result::Result<T, EnvelopeError>;

/// Whether a raw body is the forwarder's `null` answer
pub fn is_null_body(body: &str) -> bool {
    body.trim() == NULL_BODY
}

/// Decodes a single inner element
pub fn parse_log_record(entry: &str) -> serde_json::Result<LogRecord> {
    serde_json::from_str(entry)
}

/// Decodes an envelope into its records, in order
///
/// A JSON `null` body decodes to no records. Fails on the first element
/// that does not decode; partial results are never returned.
pub fn parse_log_records(body: &str) -> Result<Vec<LogRecord>> {
    let raw: Option<Vec<String>> =
        serde_json::from_str(body).map_err(EnvelopeError::OuterArray)?;
    let raw = raw.unwrap_or_default();

    raw.iter()
        .enumerate()
        .map(|(index, entry)| {
            parse_log_record(entry).map_err(|source| EnvelopeError::Entry { index, source })
        })
        .collect()
}

/// Decodes an envelope into rendered log lines
pub fn parse_log_entries(body: &str) -> Result<LogEntries> {
    Ok(parse_log_records(body)?.into_iter().collect())
}

/// Encodes records into the double-encoded envelope
pub fn encode_envelope(records: &[LogRecord]) -> Result<String> {
    let inner = records
        .iter()
        .map(serde_json::to_string)
        .collect::<serde_json::Result<Vec<_>>>()
        .map_err(EnvelopeError::Encode)?;

    serde_json::to_string(&inner).map_err(EnvelopeError::Encode)
}
