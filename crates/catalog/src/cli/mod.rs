//! The `catalog` command line.
//!
//! - `setup.rs`: clap definitions
//! - `commands.rs`: startup, logging and output selection
//! - `handlers.rs`: one handler per subcommand, key resolution, conflict retries
//! - `render.rs` and `styles.rs`: terminal text

mod commands;
mod handlers;
mod render;
mod setup;
mod styles;

pub use commands::run;
