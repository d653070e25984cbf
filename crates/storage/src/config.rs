// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store configuration

use crate::codec::Dialect;
use serde::{Deserialize, Serialize};

/// Settings chosen once when a store or writer is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// On-disk convention of the log file
    pub dialect: Dialect,
    /// fsync after every append and compaction
    pub sync: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::Braced,
            sync: true,
        }
    }
}

impl StoreConfig {
    /// Default settings with the transactional dialect
    pub fn transactional() -> Self {
        Self::default().with_dialect(Dialect::Transactional)
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }
}
