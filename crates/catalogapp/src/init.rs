//! # Startup
//!
//! [`initialize`] turns command line and environment input into a ready
//! [`CatalogApi`] over a [`FileStore`].
//!
//! ## Data Directory Resolution
//!
//! The first of these wins:
//! 1. `data_override` (the CLI's `--data <dir>`), used as is.
//! 2. The `CATALOG_DATA` environment variable. Tests use it to isolate state.
//! 3. The OS-appropriate data directory, via the `directories` crate.
//!
//! The directory need not exist yet; it is created by the first commit.
//!
//! ## Configuration
//!
//! `catalog.toml` is read from the data directory, with `CATALOG__*` environment
//! overrides on top (see [`crate::config`]). An unreadable or malformed file is a
//! startup error.
//!
//! ## Schema Check
//!
//! Building the API runs [`crate::schema::validate_schema`]. A failure there means
//! the binary itself is broken, and startup stops.

use crate::api::CatalogApi;
use crate::config::CatalogConfig;
use crate::error::{CatalogError, Result};
use crate::store::FileStore;
use clapfig::{Clapfig, SearchPath};
use directories::ProjectDirs;
use std::path::PathBuf;

/// Environment variable naming the data directory.
pub const DATA_ENV: &str = "CATALOG_DATA";

pub struct CatalogContext {
    pub api: CatalogApi<FileStore>,
    pub config: CatalogConfig,
    pub data_dir: PathBuf,
}

/// Picks the data directory: override, then `CATALOG_DATA`, then the OS default.
pub fn resolve_data_dir(data_override: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = data_override {
        return Ok(path);
    }
    if let Some(path) = std::env::var_os(DATA_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    ProjectDirs::from("com", "catalog", "catalog")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| CatalogError::Config("could not determine a data directory".to_string()))
}

/// Loads `catalog.toml` from `data_dir`, with environment overrides.
pub fn load_config(data_dir: PathBuf) -> Result<CatalogConfig> {
    Clapfig::builder()
        .app_name("catalog")
        .file_name("catalog.toml")
        .search_paths(vec![SearchPath::Path(data_dir)])
        .strict(false)
        .load()
        .map_err(|e| CatalogError::Config(e.to_string()))
}

/// Resolves the data directory, loads configuration and opens the store.
pub fn initialize(data_override: Option<PathBuf>) -> Result<CatalogContext> {
    let data_dir = resolve_data_dir(data_override)?;
    let config = load_config(data_dir.clone())?;
    tracing::debug!(
        data_dir = %data_dir.display(),
        data_file = config.data_file(),
        "opening catalog"
    );

    let store = FileStore::open_with(
        data_dir.clone(),
        config.data_file(),
        config.lock_stale_after(),
    );
    let api = CatalogApi::new(store)?;

    Ok(CatalogContext {
        api,
        config,
        data_dir,
    })
}
