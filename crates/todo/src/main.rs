// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! pott-todo - a todo list kept in a pott log

#![cfg_attr(test, allow(clippy::unwrap_used))]

mod shell;
mod todo;

use anyhow::{Context, Result};
use clap::Parser;
use pott_storage::{Dialect, Store, StoreConfig};
use shell::Shell;
use std::io;
use std::path::PathBuf;
use todo::Todos;

#[derive(Parser)]
#[command(name = "pott-todo", version, about = "A sample app using pott")]
struct Cli {
    /// Log file to keep todos in; memory-only when omitted
    file: Option<PathBuf>,

    /// On-disk dialect of the file: "braced" or "transactional"
    #[arg(long, default_value_t = Dialect::Braced)]
    dialect: Dialect,

    /// Skip fsync when writing
    #[arg(long)]
    no_sync: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging();

    println!("-=> Pott TODO <=-");
    println!("a sample app using pott");

    let config = StoreConfig::default()
        .with_dialect(cli.dialect)
        .with_sync(!cli.no_sync);
    let mut todos = Todos::default();
    let store = match &cli.file {
        Some(path) => Store::open_with(path, config, &mut todos)
            .with_context(|| format!("cannot open {}", path.display()))?,
        None => {
            println!("operating in memory-only mode, will not write any file");
            Store::in_memory(config)
        }
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    Shell::new(store, todos, stdin.lock(), stdout.lock()).run()
}

fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}
