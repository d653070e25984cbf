// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Log reader and replay
//!
//! Replay scans a log top to bottom and folds its records into a
//! [`LiveState`]. In the transactional dialect records are held back until
//! their closing marker; in the braced dialect every record applies at once.
//! A missing file replays as an empty log.

use crate::codec::{self, Dialect, Record};
use crate::state::LiveState;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that abort a replay
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("malformed line {line}: {reason}")]
    MalformedLine { line: u64, reason: &'static str },
    #[error("unterminated transaction: {pending} record(s) from line {line} have no closing marker")]
    UnterminatedTransaction { line: u64, pending: usize },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// One physical, non-blank line of a log
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogLine {
    Record(Record),
    Marker,
}

/// Outcome of replaying a log
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Replay {
    pub state: LiveState,
    /// Record lines consumed, live or superseded
    pub line_count: u64,
    /// Transaction marker lines consumed
    pub marker_count: u64,
    /// The last line had no terminating newline (torn append)
    pub unterminated_tail: bool,
}

/// Reader bound to a log file
#[derive(Debug, Clone)]
pub struct LogReader {
    path: PathBuf,
    dialect: Dialect,
}

impl LogReader {
    pub fn new(path: &Path, dialect: Dialect) -> Self {
        Self {
            path: path.to_path_buf(),
            dialect,
        }
    }

    /// Iterate over the lines of the file; empty when the file does not exist
    pub fn lines(&self) -> Result<LineIter<BufReader<File>>, ReadError> {
        match File::open(&self.path) {
            Ok(file) => Ok(LineIter::new(BufReader::new(file), self.dialect)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(LineIter::empty(self.dialect)),
            Err(e) => Err(e.into()),
        }
    }

    /// Replay the whole file
    pub fn replay(&self) -> Result<Replay, ReadError> {
        let replay = fold(self.lines()?)?;
        if replay.unterminated_tail {
            tracing::warn!(
                path = %self.path.display(),
                "log ends with an unterminated line, last append may be torn"
            );
        }
        tracing::debug!(
            path = %self.path.display(),
            lines = replay.line_count,
            live = replay.state.len(),
            "log replayed"
        );
        Ok(replay)
    }

    /// Scan the whole file and report where it stops being readable
    ///
    /// Unlike [`LogReader::replay`], corruption is reported rather than
    /// returned as an error. Only a failure to open the file is an error.
    pub fn validate(&self) -> Result<LogValidation, ReadError> {
        let mut lines = self.lines()?;
        let mut validation = LogValidation::default();
        let mut pending = 0usize;
        let mut batch_start = 0u64;

        while let Some(item) = lines.next() {
            match item {
                Ok((_, LogLine::Marker)) => {
                    validation.marker_lines += 1;
                    pending = 0;
                }
                Ok((line, LogLine::Record(_))) => {
                    validation.record_lines += 1;
                    if self.dialect.uses_markers() {
                        if pending == 0 {
                            batch_start = line;
                        }
                        pending += 1;
                    }
                }
                Err(ReadError::MalformedLine { line, reason }) => {
                    validation.corruption = Some(LogCorruption {
                        line,
                        reason: reason.to_string(),
                    });
                    break;
                }
                Err(e) => {
                    validation.corruption = Some(LogCorruption {
                        line: lines.line_number() + 1,
                        reason: e.to_string(),
                    });
                    break;
                }
            }
        }

        if validation.corruption.is_none() && pending > 0 {
            validation.corruption = Some(LogCorruption {
                line: batch_start,
                reason: format!("unterminated transaction ({} pending records)", pending),
            });
        }
        validation.unterminated_tail = lines.unterminated_tail();

        Ok(validation)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }
}

/// Replay a log from any buffered byte stream
pub fn replay<R: BufRead>(source: R, dialect: Dialect) -> Result<Replay, ReadError> {
    fold(LineIter::new(source, dialect))
}

/// Live records of a log file, sorted by namespace then key
pub fn read(path: &Path, dialect: Dialect) -> Result<Vec<Record>, ReadError> {
    Ok(LogReader::new(path, dialect).replay()?.state.into_records())
}

fn fold<R: BufRead>(mut lines: LineIter<R>) -> Result<Replay, ReadError> {
    let batched = lines.dialect.uses_markers();
    let mut replay = Replay::default();
    let mut pending: Vec<Record> = Vec::new();
    let mut batch_start = 0u64;

    for item in lines.by_ref() {
        match item? {
            (_, LogLine::Marker) => {
                replay.marker_count += 1;
                for record in pending.drain(..) {
                    replay.state.apply(record);
                }
            }
            (line, LogLine::Record(record)) => {
                replay.line_count += 1;
                if batched {
                    if pending.is_empty() {
                        batch_start = line;
                    }
                    pending.push(record);
                } else {
                    replay.state.apply(record);
                }
            }
        }
    }

    if !pending.is_empty() {
        return Err(ReadError::UnterminatedTransaction {
            line: batch_start,
            pending: pending.len(),
        });
    }
    replay.unterminated_tail = lines.unterminated_tail();

    Ok(replay)
}

/// Iterator over the non-blank lines of a log, with 1-based line numbers
pub struct LineIter<R> {
    reader: Option<R>,
    dialect: Dialect,
    buf: String,
    line_number: u64,
    unterminated_tail: bool,
}

impl<R: BufRead> LineIter<R> {
    pub fn new(reader: R, dialect: Dialect) -> Self {
        Self {
            reader: Some(reader),
            dialect,
            buf: String::new(),
            line_number: 0,
            unterminated_tail: false,
        }
    }

    fn empty(dialect: Dialect) -> Self {
        Self {
            reader: None,
            dialect,
            buf: String::new(),
            line_number: 0,
            unterminated_tail: false,
        }
    }

    /// Physical line number of the last line read
    pub fn line_number(&self) -> u64 {
        self.line_number
    }

    /// Whether the last non-blank line lacked its newline
    pub fn unterminated_tail(&self) -> bool {
        self.unterminated_tail
    }
}

impl<R: BufRead> Iterator for LineIter<R> {
    type Item = Result<(u64, LogLine), ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        let reader = self.reader.as_mut()?;

        loop {
            self.buf.clear();
            match reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {
                    self.line_number += 1;
                    if self.buf.trim().is_empty() {
                        continue;
                    }
                    self.unterminated_tail = !self.buf.ends_with('\n');

                    let line = self.line_number;
                    if self.dialect.uses_markers() && codec::is_marker(&self.buf) {
                        return Some(Ok((line, LogLine::Marker)));
                    }
                    return Some(
                        codec::decode(&self.buf, self.dialect)
                            .map(|record| (line, LogLine::Record(record)))
                            .map_err(|e| ReadError::MalformedLine {
                                line,
                                reason: e.reason,
                            }),
                    );
                }
                Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                    self.reader = None;
                    self.line_number += 1;
                    return Some(Err(ReadError::MalformedLine {
                        line: self.line_number,
                        reason: "invalid UTF-8",
                    }));
                }
                Err(e) => {
                    self.reader = None;
                    return Some(Err(e.into()));
                }
            }
        }
    }
}

/// Result of validating a log file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogValidation {
    pub record_lines: u64,
    pub marker_lines: u64,
    pub corruption: Option<LogCorruption>,
    pub unterminated_tail: bool,
}

impl LogValidation {
    pub fn is_clean(&self) -> bool {
        self.corruption.is_none() && !self.unterminated_tail
    }
}

/// First unreadable spot in a log file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogCorruption {
    pub line: u64,
    pub reason: String,
}

#[cfg(test)]
#[path = "reader_tests.rs"]
mod tests;
