// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Line codec for the on-disk log
//!
//! Every record is one line of UTF-8 text:
//!
//! ```text
//! namespace key payload\n    (live value)
//! namespace key\n            (tombstone)
//! ```
//!
//! Two dialects exist and they are not byte-compatible:
//!
//! - [`Dialect::Transactional`] splits on spaces; the payload is everything
//!   after the second space. Batches are closed by a [`MARKER`] line.
//! - [`Dialect::Braced`] finds the payload at the first `{`. Every line is
//!   its own batch, so payloads must be JSON objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Line that closes a batch in the transactional dialect
pub const MARKER: &str = "-";

/// Errors raised while encoding a record
///
/// These are caller errors: nothing has been written when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("invalid {field} {value:?}: must be non-empty without spaces, braces or control characters")]
    InvalidIdentifier { field: &'static str, value: String },
    #[error("invalid payload: {reason}")]
    InvalidPayload { reason: &'static str },
}

/// A line that could not be decoded into a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct DecodeError {
    pub reason: &'static str,
}

/// On-disk convention used by a log file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Space-delimited records, every batch closed by a `-` line
    Transactional,
    /// Payload detected by its opening brace, every line is its own batch
    #[default]
    Braced,
}

impl Dialect {
    /// Whether batches are closed by an explicit marker line
    pub fn uses_markers(self) -> bool {
        matches!(self, Dialect::Transactional)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::Transactional => "transactional",
            Dialect::Braced => "braced",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized dialect name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown dialect {0:?} (expected \"transactional\" or \"braced\")")]
pub struct UnknownDialect(pub String);

impl FromStr for Dialect {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "transactional" => Ok(Dialect::Transactional),
            "braced" => Ok(Dialect::Braced),
            other => Err(UnknownDialect(other.to_string())),
        }
    }
}

/// A namespaced key/value fact. An empty payload is a tombstone.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Record {
    pub namespace: String,
    pub key: String,
    pub payload: String,
}

impl Record {
    pub fn new(
        namespace: impl Into<String>,
        key: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            key: key.into(),
            payload: payload.into(),
        }
    }

    /// Record that deletes `namespace/key`
    pub fn tombstone(namespace: impl Into<String>, key: impl Into<String>) -> Self {
        Self::new(namespace, key, String::new())
    }

    pub fn is_tombstone(&self) -> bool {
        self.payload.is_empty()
    }

    /// Check that the record can be written in `dialect` and read back unchanged
    pub fn validate(&self, dialect: Dialect) -> Result<(), CodecError> {
        validate_identifier("namespace", &self.namespace)?;
        validate_identifier("key", &self.key)?;

        if self.payload.contains(['\n', '\r']) {
            return Err(CodecError::InvalidPayload {
                reason: "payload must not contain line breaks",
            });
        }
        if dialect == Dialect::Braced
            && !self.payload.is_empty()
            && !self.payload.starts_with('{')
        {
            return Err(CodecError::InvalidPayload {
                reason: "braced payload must start with '{'",
            });
        }
        Ok(())
    }
}

fn is_reserved(c: char) -> bool {
    c == ' ' || c == '{' || c == '}' || c.is_control()
}

fn is_identifier(value: &str) -> bool {
    !value.is_empty() && !value.contains(is_reserved)
}

fn validate_identifier(field: &'static str, value: &str) -> Result<(), CodecError> {
    if is_identifier(value) {
        Ok(())
    } else {
        Err(CodecError::InvalidIdentifier {
            field,
            value: value.to_string(),
        })
    }
}

/// Encode a record as one newline-terminated line
pub fn encode(record: &Record, dialect: Dialect) -> Result<String, CodecError> {
    let mut line = String::with_capacity(
        record.namespace.len() + record.key.len() + record.payload.len() + 3,
    );
    encode_into(record, dialect, &mut line)?;
    Ok(line)
}

/// Append the encoded line for `record` to `buf`
///
/// `buf` is left untouched when the record is invalid.
pub fn encode_into(record: &Record, dialect: Dialect, buf: &mut String) -> Result<(), CodecError> {
    record.validate(dialect)?;

    buf.push_str(&record.namespace);
    buf.push(' ');
    buf.push_str(&record.key);
    if !record.is_tombstone() {
        buf.push(' ');
        buf.push_str(&record.payload);
    }
    buf.push('\n');
    Ok(())
}

/// Strip the line terminator (`\n` or `\r\n`) if present
pub(crate) fn trim_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Whether `line` is a transaction marker
pub fn is_marker(line: &str) -> bool {
    trim_terminator(line) == MARKER
}

/// Decode one line (with or without its terminator) into a record
pub fn decode(line: &str, dialect: Dialect) -> Result<Record, DecodeError> {
    let line = trim_terminator(line);
    match dialect {
        Dialect::Transactional => decode_spaced(line),
        Dialect::Braced => decode_braced(line),
    }
}

fn decode_spaced(line: &str) -> Result<Record, DecodeError> {
    let (namespace, rest) = line.split_once(' ').ok_or(DecodeError {
        reason: "no space between namespace and key",
    })?;
    let (key, payload) = rest.split_once(' ').unwrap_or((rest, ""));
    record_from_parts(namespace, key, payload)
}

fn decode_braced(line: &str) -> Result<Record, DecodeError> {
    let (header, payload) = match line.find('{') {
        Some(start) => line.split_at(start),
        None => (line, ""),
    };
    let header = header.trim_end_matches(' ');
    let (namespace, key) = header.split_once(' ').ok_or(DecodeError {
        reason: "no space between namespace and key",
    })?;
    if key.contains(' ') {
        return Err(DecodeError {
            reason: "unexpected text between key and payload",
        });
    }
    record_from_parts(namespace, key, payload)
}

fn record_from_parts(namespace: &str, key: &str, payload: &str) -> Result<Record, DecodeError> {
    if !is_identifier(namespace) {
        return Err(DecodeError {
            reason: "invalid namespace",
        });
    }
    if !is_identifier(key) {
        return Err(DecodeError {
            reason: "invalid key",
        });
    }
    Ok(Record::new(namespace, key, payload))
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
