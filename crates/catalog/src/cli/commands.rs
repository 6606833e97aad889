//! # CLI Layer
//!
//! This module is **one possible client** of the catalog, not the catalog itself.
//!
//! The CLI layer is the **only** place in the codebase that:
//! - Knows about terminal I/O (stdout, stderr)
//! - Installs a tracing subscriber
//! - Retries an operation that lost a commit race
//!
//! ## Flow
//!
//! 1. **Parse**: clap turns arguments into a [`Cli`]
//! 2. **Logging**: `CATALOG_LOG` (an `EnvFilter` directive) or `--verbose` picks the level
//! 3. **Context**: [`initialize`] resolves the data directory, config and store
//! 4. **Dispatch**: [`handlers::dispatch`] runs the command, retrying on `Conflict`
//! 5. **Output**: pretty JSON with `--json`, styled text otherwise

use super::handlers::{self, AppState};
use super::render::render;
use super::setup::Cli;
use anyhow::{Context, Result};
use catalogapp::init::initialize;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `CATALOG_LOG=catalogapp=debug`.
pub const LOG_ENV: &str = "CATALOG_LOG";

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = initialize(cli.data.clone())?;
    debug!(data_dir = %ctx.data_dir.display(), "catalog ready");
    let state = AppState::new(ctx.api, ctx.config.conflict_retries);

    let output = handlers::dispatch(&state, &cli.command)?;
    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("could not encode output")?;
        println!("{json}");
    } else {
        println!("{}", render(&output));
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
