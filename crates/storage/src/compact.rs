// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Log compaction
//!
//! Compaction replays a log and rewrites it with exactly one line per live
//! key, in ascending namespace/key order. Superseded values and tombstones
//! are dropped. The output is a snapshot: in the transactional dialect it is
//! closed by a single marker, in the braced dialect it has none.
//!
//! The new file is written next to the destination and renamed over it, so
//! the source may be the destination. Another process appending to the
//! source during compaction will lose its writes.

use crate::codec::CodecError;
use crate::config::StoreConfig;
use crate::reader::{LogReader, ReadError};
use crate::writer::encode_batch;
use serde::Serialize;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during compaction
#[derive(Debug, Error)]
pub enum CompactError {
    #[error("replay failed: {0}")]
    Read(#[from] ReadError),
    #[error("invalid record: {0}")]
    Codec(#[from] CodecError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result of a compaction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CompactionResult {
    /// Record lines in the source
    pub lines_before: u64,
    /// Record lines in the destination (one per live key)
    pub lines_after: u64,
    pub bytes_before: u64,
    pub bytes_after: u64,
}

impl CompactionResult {
    pub fn lines_removed(&self) -> u64 {
        self.lines_before.saturating_sub(self.lines_after)
    }
}

/// Compact `source` into `dest`
pub fn compact(
    source: &Path,
    dest: &Path,
    config: &StoreConfig,
) -> Result<CompactionResult, CompactError> {
    let bytes_before = file_len(source)?;
    let replay = LogReader::new(source, config.dialect).replay()?;
    let lines_before = replay.line_count;

    let records = replay.state.into_records();
    let snapshot = encode_batch(&records, config.dialect)?;
    write_replacing(dest, snapshot.as_bytes(), config.sync)?;

    let result = CompactionResult {
        lines_before,
        lines_after: records.len() as u64,
        bytes_before,
        bytes_after: snapshot.len() as u64,
    };

    tracing::info!(
        source = %source.display(),
        dest = %dest.display(),
        lines_removed = result.lines_removed(),
        lines_kept = result.lines_after,
        bytes_reclaimed = bytes_before.saturating_sub(result.bytes_after),
        "log compacted"
    );

    Ok(result)
}

fn file_len(path: &Path) -> io::Result<u64> {
    match fs::metadata(path) {
        Ok(meta) => Ok(meta.len()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
        Err(e) => Err(e),
    }
}

/// Sibling path the snapshot is staged in before the rename
fn temp_path(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("log"));
    name.push(".compact.tmp");
    dest.with_file_name(name)
}

fn write_replacing(dest: &Path, bytes: &[u8], sync: bool) -> io::Result<()> {
    let temp = temp_path(dest);
    let staged = stage(&temp, dest, bytes, sync);
    if staged.is_err() {
        let _ = fs::remove_file(&temp);
    }
    staged
}

fn stage(temp: &Path, dest: &Path, bytes: &[u8], sync: bool) -> io::Result<()> {
    let mut file = File::create(temp)?;
    file.write_all(bytes)?;
    if sync {
        file.sync_all()?;
    }
    // rename is atomic on POSIX
    fs::rename(temp, dest)
}

#[cfg(test)]
#[path = "compact_tests.rs"]
mod tests;
