// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Check command: validate a log file without modifying it

use anyhow::{bail, Result};
use pott_storage::{LogReader, StoreConfig};
use std::path::PathBuf;

#[derive(clap::Args)]
pub struct CheckArgs {
    /// Log file to validate
    pub file: PathBuf,
}

pub fn handle(args: CheckArgs, config: StoreConfig) -> Result<()> {
    let reader = LogReader::new(&args.file, config.dialect);
    let validation = reader.validate()?;

    println!("check {} ({})", args.file.display(), config.dialect);
    println!("record lines: {:>6}", validation.record_lines);
    if config.dialect.uses_markers() {
        println!("marker lines: {:>6}", validation.marker_lines);
    }
    if validation.unterminated_tail {
        println!("last line is not newline-terminated, the last append may be torn");
    }

    if let Some(corruption) = validation.corruption {
        println!("line {}: {}", corruption.line, corruption.reason);
        bail!(
            "{} is not a valid {} log",
            args.file.display(),
            config.dialect
        );
    }
    if validation.unterminated_tail {
        bail!("{} has a torn last line", args.file.display());
    }

    println!("ok");
    Ok(())
}
