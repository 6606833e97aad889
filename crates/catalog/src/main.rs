//! # Catalog CLI Architecture
//!
//! The binary is intentionally thin: the CLI lives in `src/cli/`, while this file only
//! invokes `cli::run()` and handles process termination.
//!
//! ## Workspace Structure
//!
//! - `crates/catalogapp/`: core library with UI-agnostic business logic
//! - `crates/catalog/`: this CLI tool, depends on the `catalogapp` library
//!
//! ## Layering
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (crates/catalog/src/cli/)                        │
//! │  - clap argument parsing (setup.rs)                         │
//! │  - Logging + context wiring (commands.rs)                   │
//! │  - Key resolution + conflict retries (handlers.rs)          │
//! │  - Terminal rendering via console styles (render.rs)        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (crates/catalogapp/src/api.rs)                   │
//! │  - Dispatches to command modules                            │
//! │  - Returns structured records and reports                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything from `api.rs` inward is UI agnostic. The CLI layer owns every
//! user-facing concern: parsing, logging, rendering and exit codes.
//!
//! ## Testing Approach
//!
//! - **Library (`crates/catalogapp/`)**: unit tests per command plus integration
//!   scenarios against a real data file.
//! - **CLI**: parsing and rendering unit tests, plus end-to-end runs of the binary
//!   in `tests/` against a temporary data directory.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
