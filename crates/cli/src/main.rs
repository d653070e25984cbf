// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! pott - inspect and compact pott log files

#![cfg_attr(test, allow(clippy::unwrap_used))]

mod commands;
mod completions;
mod error;
mod output;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use commands::{check, compact, stat};
use completions::CompletionsArgs;
use pott_storage::{Dialect, StoreConfig};

#[derive(Parser)]
#[command(
    name = "pott",
    version,
    about = "Pott is a tool for managing pott files",
    arg_required_else_help = true
)]
struct Cli {
    /// On-disk dialect of the file: "braced" or "transactional"
    #[arg(long, global = true, default_value_t = Dialect::Braced)]
    dialect: Dialect,

    /// Skip fsync when writing
    #[arg(long, global = true)]
    no_sync: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report total, used and unused lines of a file
    ///
    /// Safe to run against a file that is in use by another process.
    Stat(stat::StatArgs),
    /// Rewrite a file keeping one line per live key
    ///
    /// Source and dest may be the same file. NOT safe to run against a
    /// file that is in use by another process.
    Compact(compact::CompactArgs),
    /// Validate a file and report the first unreadable line
    Check(check::CheckArgs),
    /// Show program version
    Version,
    /// Generate shell completions
    Completions(CompletionsArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging();

    let config = StoreConfig::default()
        .with_dialect(cli.dialect)
        .with_sync(!cli.no_sync);
    tracing::debug!(dialect = %config.dialect, sync = config.sync, "pott starting");

    match cli.command {
        Commands::Stat(args) => stat::handle(args, config),
        Commands::Compact(args) => compact::handle(args, config),
        Commands::Check(args) => check::handle(args, config),
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Completions(args) => {
            let mut cmd = Cli::command();
            completions::write_completions(&mut cmd, args.shell, &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Log to stderr so command output on stdout stays machine-readable
fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
