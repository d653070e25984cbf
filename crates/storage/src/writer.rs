// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Log writer for batch appends
//!
//! A batch is encoded into memory first, so an invalid record leaves the
//! file untouched. The buffer then goes out in one open-append-write-close
//! cycle. If that write fails part way, the file may end in a torn line or
//! an unclosed batch; the error is returned and nothing is repaired.

use crate::codec::{self, CodecError, Dialect, Record, MARKER};
use crate::config::StoreConfig;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while appending a batch
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("invalid record: {0}")]
    Codec(#[from] CodecError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Encode a batch, closing it with a marker when the dialect uses one
///
/// An empty batch encodes to an empty string.
pub fn encode_batch(records: &[Record], dialect: Dialect) -> Result<String, CodecError> {
    let mut buf = String::new();
    for record in records {
        codec::encode_into(record, dialect, &mut buf)?;
    }
    if dialect.uses_markers() && !records.is_empty() {
        buf.push_str(MARKER);
        buf.push('\n');
    }
    Ok(buf)
}

/// Appends batches to one log file
#[derive(Debug, Clone)]
pub struct LogWriter {
    path: PathBuf,
    dialect: Dialect,
    sync: bool,
}

impl LogWriter {
    pub fn new(path: &Path, config: &StoreConfig) -> Self {
        Self {
            path: path.to_path_buf(),
            dialect: config.dialect,
            sync: config.sync,
        }
    }

    /// Append one batch, creating the file if needed
    ///
    /// Returns the number of bytes written.
    pub fn append(&self, records: &[Record]) -> Result<u64, WriteError> {
        let batch = encode_batch(records, self.dialect)?;
        if batch.is_empty() {
            return Ok(0);
        }

        self.write(batch.as_bytes())?;
        tracing::debug!(
            path = %self.path.display(),
            records = records.len(),
            bytes = batch.len(),
            "batch appended"
        );
        Ok(batch.len() as u64)
    }

    fn write(&self, bytes: &[u8]) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(bytes)?;
        if self.sync {
            file.sync_all()?;
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }
}

/// Append one batch to the log at `path`
pub fn append(path: &Path, records: &[Record], config: &StoreConfig) -> Result<u64, WriteError> {
    LogWriter::new(path, config).append(records)
}

#[cfg(test)]
#[path = "writer_tests.rs"]
mod tests;
