// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compact command: drop superseded and deleted lines

use crate::error::CliError;
use crate::output::{self, OutputFormat};
use anyhow::Result;
use pott_storage::{CompactionResult, Store, StoreConfig};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

#[derive(clap::Args)]
pub struct CompactArgs {
    /// Log file to read
    pub source: PathBuf,

    /// File to write, replaced if it exists (may equal source)
    pub dest: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

pub fn handle(args: CompactArgs, config: StoreConfig) -> Result<()> {
    let store = Store::open(&args.source, config)
        .map_err(|e| CliError::open_failed(&args.source, config.dialect, e))?;
    let result = store.compact_to(&args.dest).map_err(|e| {
        CliError::new(format!("cannot compact {}", args.source.display()))
            .with_context(format!("writing {}", args.dest.display()))
            .with_source(e)
    })?;

    output::print(
        &CompactReport {
            source: args.source,
            dest: args.dest,
            result,
        },
        args.format,
    )
}

#[derive(Debug, Serialize)]
pub struct CompactReport {
    pub source: PathBuf,
    pub dest: PathBuf,
    #[serde(flatten)]
    pub result: CompactionResult,
}

impl fmt::Display for CompactReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "compact {} to {}",
            self.source.display(),
            self.dest.display()
        )?;
        write!(
            f,
            "kept {} of {} lines, {} -> {} bytes",
            self.result.lines_after,
            self.result.lines_before,
            self.result.bytes_before,
            self.result.bytes_after
        )
    }
}
