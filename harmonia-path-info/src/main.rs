// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

use std::io::{BufWriter, Write};
use std::process::ExitCode;

use clap::Parser;
use harmonia_path_info::error::IoErrorContext;
use harmonia_path_info::{
    LocalStore, PathInfoReporter, Result, StoreDir, config, open_substituter, select_paths,
};
use harmonia_store_db::StoreDb;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod args;

use args::Args;

fn run(args: Args) -> Result<()> {
    let mut config = config::load(args.config.as_deref())?;
    args.apply_overrides(&mut config);
    config.validate()?;

    let store_dir = StoreDir::new(config.store_dir.as_str());
    debug!("Store directory: {store_dir}");
    debug!("Database path: {}", config.db_path.display());

    let db = StoreDb::open_system_at(&config.db_path)?;
    let mut substituters = Vec::with_capacity(config.substituters.len());
    for uri in &config.substituters {
        if let Some(sub) = open_substituter(uri, &store_dir)? {
            substituters.push(sub);
        }
    }
    let store = LocalStore::new(store_dir, db).with_substituters(substituters);

    let paths = select_paths(&store, &args.paths, args.recursive, args.all)?;

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    PathInfoReporter::new(&store, args.request()).run(&paths, &mut out)?;
    out.flush().io_context("Failed to flush output")?;
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
