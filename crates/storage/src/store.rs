// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Live store bound to one log file
//!
//! The store never caches live state. Opening replays the log into a
//! caller-owned [`Restore`] sink, and every [`Store::stat`] or
//! [`Store::compact`] rescans the file from the start.
//!
//! Calls on one store are serialized by a mutex. After a failed append the
//! store is poisoned: later saves are rejected so that a torn tail is not
//! buried under further appends. Only reopening clears it.
//!
//! A log that already ends in an unterminated line opens with writes
//! refused for the same reason. An in-place [`Store::compact`] rewrites the
//! file with every line terminated and lifts the refusal.

use crate::codec::{CodecError, Record};
use crate::compact::{self, CompactError, CompactionResult};
use crate::config::StoreConfig;
use crate::reader::{LogReader, ReadError};
use crate::state::LiveState;
use crate::writer::{encode_batch, LogWriter, WriteError};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

/// Error type a restore sink may return
pub type RestoreError = Box<dyn std::error::Error + Send + Sync>;

/// Receives every live record while a store is opened
pub trait Restore {
    fn restore(&mut self, namespace: &str, key: &str, payload: &[u8]) -> Result<(), RestoreError>;
}

impl<F> Restore for F
where
    F: FnMut(&str, &str, &[u8]) -> Result<(), RestoreError>,
{
    fn restore(&mut self, namespace: &str, key: &str, payload: &[u8]) -> Result<(), RestoreError> {
        self(namespace, key, payload)
    }
}

impl Restore for LiveState {
    fn restore(&mut self, namespace: &str, key: &str, payload: &[u8]) -> Result<(), RestoreError> {
        let payload = std::str::from_utf8(payload)?;
        self.apply(Record::new(namespace, key, payload));
        Ok(())
    }
}

/// Errors from store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid record: {0}")]
    Codec(#[from] CodecError),
    #[error("replay failed: {0}")]
    Read(#[from] ReadError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("restore of {namespace}/{key} failed: {source}")]
    Restore {
        namespace: String,
        key: String,
        #[source]
        source: RestoreError,
    },
    #[error("store rejected write after previous error: {cause}")]
    Poisoned { cause: String },
}

impl From<CompactError> for StoreError {
    fn from(e: CompactError) -> Self {
        match e {
            CompactError::Read(e) => StoreError::Read(e),
            CompactError::Codec(e) => StoreError::Codec(e),
            CompactError::Io(e) => StoreError::Io(e),
        }
    }
}

/// Line statistics of a log file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stat {
    /// Record lines in the file
    pub total_lines: u64,
    /// Lines holding a live value
    pub used_lines: u64,
}

impl Stat {
    pub fn unused_lines(&self) -> u64 {
        self.total_lines.saturating_sub(self.used_lines)
    }
}

/// Reason given for refusing writes to a log with a torn last line
const TORN_TAIL: &str = "log ends with an unterminated line";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Health {
    Healthy,
    /// Opened on a log whose last line has no newline; cleared by compaction
    TornTail,
    /// Terminal until the store is reopened
    Poisoned(String),
}

/// Append-only key/value store over one log file
#[derive(Debug)]
pub struct Store {
    /// `None` for a memory-only store
    writer: Option<LogWriter>,
    config: StoreConfig,
    health: Mutex<Health>,
}

impl Store {
    /// Open a store; an empty path opens a memory-only store
    pub fn open(path: impl AsRef<Path>, config: StoreConfig) -> Result<Self, StoreError> {
        Self::open_inner(path.as_ref(), config, None)
    }

    /// Open a store and hand every live record to `sink`
    ///
    /// Records arrive in ascending namespace/key order, which callers should
    /// not depend on. A sink error aborts the open.
    pub fn open_with(
        path: impl AsRef<Path>,
        config: StoreConfig,
        sink: &mut dyn Restore,
    ) -> Result<Self, StoreError> {
        Self::open_inner(path.as_ref(), config, Some(sink))
    }

    /// Store that validates saves but never touches the filesystem
    pub fn in_memory(config: StoreConfig) -> Self {
        Self {
            writer: None,
            config,
            health: Mutex::new(Health::Healthy),
        }
    }

    fn open_inner(
        path: &Path,
        config: StoreConfig,
        sink: Option<&mut dyn Restore>,
    ) -> Result<Self, StoreError> {
        if path.as_os_str().is_empty() {
            tracing::debug!("opening memory-only store");
            return Ok(Self::in_memory(config));
        }

        let replay = LogReader::new(path, config.dialect).replay()?;
        if let Some(sink) = sink {
            for (namespace, key, payload) in replay.state.iter() {
                sink.restore(namespace, key, payload.as_bytes())
                    .map_err(|source| StoreError::Restore {
                        namespace: namespace.to_string(),
                        key: key.to_string(),
                        source,
                    })?;
            }
        }

        tracing::info!(
            path = %path.display(),
            dialect = %config.dialect,
            lines = replay.line_count,
            live = replay.state.len(),
            "store opened"
        );

        let health = if replay.unterminated_tail {
            tracing::warn!(
                path = %path.display(),
                "refusing writes until the log is compacted"
            );
            Health::TornTail
        } else {
            Health::Healthy
        };

        Ok(Self {
            writer: Some(LogWriter::new(path, &config)),
            config,
            health: Mutex::new(health),
        })
    }

    /// Record `payload` for `namespace/key`; `None` or `""` deletes the key
    pub fn save(&self, namespace: &str, key: &str, payload: Option<&str>) -> Result<(), StoreError> {
        let record = Record::new(namespace, key, payload.unwrap_or_default());
        self.save_batch(std::slice::from_ref(&record))
    }

    /// Serialize `value` as JSON and save it; `None` deletes the key
    pub fn save_value<T: Serialize + ?Sized>(
        &self,
        namespace: &str,
        key: &str,
        value: Option<&T>,
    ) -> Result<(), StoreError> {
        let payload = value.map(serde_json::to_string).transpose()?;
        self.save(namespace, key, payload.as_deref())
    }

    /// Append `records` as one batch
    ///
    /// In the transactional dialect the batch replays all-or-nothing.
    pub fn save_batch(&self, records: &[Record]) -> Result<(), StoreError> {
        let Some(writer) = &self.writer else {
            encode_batch(records, self.config.dialect)?;
            return Ok(());
        };

        let mut health = self.lock();
        match &*health {
            Health::Healthy => {}
            Health::TornTail => {
                return Err(StoreError::Poisoned {
                    cause: TORN_TAIL.to_string(),
                })
            }
            Health::Poisoned(cause) => {
                return Err(StoreError::Poisoned {
                    cause: cause.clone(),
                })
            }
        }

        match writer.append(records) {
            Ok(_) => Ok(()),
            Err(WriteError::Codec(e)) => Err(e.into()),
            Err(WriteError::Io(e)) => {
                tracing::warn!(
                    path = %writer.path().display(),
                    error = %e,
                    "append failed, store poisoned"
                );
                *health = Health::Poisoned(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Count total and live lines with a full rescan
    pub fn stat(&self) -> Result<Stat, StoreError> {
        let Some(writer) = &self.writer else {
            return Ok(Stat::default());
        };

        let _health = self.lock();
        let replay = LogReader::new(writer.path(), self.config.dialect).replay()?;
        Ok(Stat {
            total_lines: replay.line_count,
            used_lines: replay.state.len() as u64,
        })
    }

    /// Rewrite the log in place with only its live records
    ///
    /// A store opened on a torn log accepts writes again afterwards.
    pub fn compact(&self) -> Result<CompactionResult, StoreError> {
        let Some(writer) = &self.writer else {
            return Ok(CompactionResult::default());
        };

        let mut health = self.lock();
        let result = compact::compact(writer.path(), writer.path(), &self.config)?;
        if *health == Health::TornTail {
            tracing::info!(path = %writer.path().display(), "torn log compacted, writes resumed");
            *health = Health::Healthy;
        }
        Ok(result)
    }

    /// Write the live records of the log to `dest`, replacing it
    pub fn compact_to(&self, dest: impl AsRef<Path>) -> Result<CompactionResult, StoreError> {
        let Some(writer) = &self.writer else {
            return Ok(CompactionResult::default());
        };

        let _health = self.lock();
        Ok(compact::compact(writer.path(), dest.as_ref(), &self.config)?)
    }

    /// Path of the log file, `None` for a memory-only store
    pub fn path(&self) -> Option<&Path> {
        self.writer.as_ref().map(LogWriter::path)
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn is_memory(&self) -> bool {
        self.writer.is_none()
    }

    /// Whether saves are currently refused
    pub fn is_poisoned(&self) -> bool {
        !matches!(*self.lock(), Health::Healthy)
    }

    fn lock(&self) -> MutexGuard<'_, Health> {
        self.health.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
