// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stat command: line usage of a log file

use crate::error::CliError;
use crate::output::{self, OutputFormat};
use anyhow::Result;
use pott_storage::{Stat, Store, StoreConfig};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

#[derive(clap::Args)]
pub struct StatArgs {
    /// Log file to inspect
    pub file: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

pub fn handle(args: StatArgs, config: StoreConfig) -> Result<()> {
    let store = Store::open(&args.file, config)
        .map_err(|e| CliError::open_failed(&args.file, config.dialect, e))?;
    let stat = store.stat()?;

    output::print(&StatReport::new(args.file, stat), args.format)
}

/// Stat of one file, as printed by `pott stat`
#[derive(Debug, Serialize)]
pub struct StatReport {
    pub file: PathBuf,
    pub total_lines: u64,
    pub used_lines: u64,
    pub unused_lines: u64,
}

impl StatReport {
    pub fn new(file: PathBuf, stat: Stat) -> Self {
        Self {
            file,
            total_lines: stat.total_lines,
            used_lines: stat.used_lines,
            unused_lines: stat.unused_lines(),
        }
    }
}

impl fmt::Display for StatReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "stat {}", self.file.display())?;
        if self.total_lines == 0 {
            return write!(
                f,
                "no lines found, file {} seems to be empty",
                self.file.display()
            );
        }

        let used_percent = 100 * self.used_lines / self.total_lines;
        writeln!(f, "total  lines: {:>6} (100%)", self.total_lines)?;
        writeln!(f, "used   lines: {:>6} ({}%)", self.used_lines, used_percent)?;
        write!(
            f,
            "unused lines: {:>6} ({}%)",
            self.unused_lines,
            100 - used_percent
        )
    }
}
