// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! pott-storage: append-only, line-oriented key/value log
//!
//! Records are `(namespace, key, payload)` lines appended to a plain text
//! file. Current state is never stored; it is rebuilt by replaying the file
//! from the top, last write wins, empty payloads delete.
//!
//! ## Architecture
//!
//! ```text
//! Record → codec → LogWriter → disk (one line per record)
//!                                  ↓
//!                        LogReader → replay → LiveState
//!                                  ↓
//!                        compact → one line per live key
//! ```
//!
//! [`Store`] ties these together for one file and adds stats, compaction,
//! restore-on-open and poisoning after write failures.
//!
//! ## Batches without a store
//!
//! [`append`] and [`read`] work on a path directly:
//!
//! ```
//! use pott_storage::{append, read, Record, StoreConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let dir = tempfile::tempdir()?;
//! let path = dir.path().join("todos.pott");
//! let config = StoreConfig::transactional();
//!
//! append(
//!     &path,
//!     &[
//!         Record::new("todos", "1", "Build Binary"),
//!         Record::new("todos", "2", "Ship it"),
//!     ],
//!     &config,
//! )?;
//! append(&path, &[Record::tombstone("todos", "1")], &config)?;
//!
//! let live = read(&path, config.dialect)?;
//! assert_eq!(live, vec![Record::new("todos", "2", "Ship it")]);
//! # Ok(())
//! # }
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod codec;
pub mod compact;
pub mod config;
pub mod reader;
pub mod state;
pub mod store;
pub mod writer;

pub use codec::{decode, encode, CodecError, DecodeError, Dialect, Record, UnknownDialect, MARKER};
pub use compact::{compact, CompactError, CompactionResult};
pub use config::StoreConfig;
pub use reader::{
    read, replay, LineIter, LogCorruption, LogLine, LogReader, LogValidation, ReadError, Replay,
};
pub use state::LiveState;
pub use store::{Restore, RestoreError, Stat, Store, StoreError};
pub use writer::{append, encode_batch, LogWriter, WriteError};
