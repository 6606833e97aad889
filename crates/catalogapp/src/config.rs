//! # Configuration
//!
//! Catalog configuration is managed by [`clapfig`], which handles layered loading
//! from TOML files, environment variables, and programmatic overrides.
//!
//! ## Storage Hierarchy
//!
//! Configuration is resolved in priority order:
//! 1. **Environment variables**: `CATALOG__DATA_FILE`, `CATALOG__CONFLICT_RETRIES`, etc.
//! 2. **Data directory config**: `<data dir>/catalog.toml`.
//! 3. **Compiled Defaults**: Built-in fallbacks via `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `data_file` | `catalog.json` | JSON data file inside the data directory |
//! | `lock_stale_after_secs` | `30` | Age after which a writer lock is considered abandoned |
//! | `conflict_retries` | `3` | Re-runs of an operation that lost a commit race (CLI only) |

use confique::Config;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the catalog, stored in `catalog.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Name of the JSON data file inside the data directory.
    #[config(default = "catalog.json")]
    pub data_file: String,

    /// Seconds after which a leftover writer lock is broken.
    #[config(default = 30)]
    pub lock_stale_after_secs: u64,

    /// How many times the CLI re-runs an operation that lost a commit race.
    #[config(default = 3)]
    pub conflict_retries: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            data_file: "catalog.json".to_string(),
            lock_stale_after_secs: 30,
            conflict_retries: 3,
        }
    }
}

impl CatalogConfig {
    pub fn lock_stale_after(&self) -> Duration {
        Duration::from_secs(self.lock_stale_after_secs)
    }

    /// The data file name, falling back to the default when blank.
    pub fn data_file(&self) -> &str {
        let name = self.data_file.trim();
        if name.is_empty() {
            "catalog.json"
        } else {
            name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CatalogConfig::default();
        assert_eq!(config.data_file(), "catalog.json");
        assert_eq!(config.lock_stale_after(), Duration::from_secs(30));
        assert_eq!(config.conflict_retries, 3);
    }

    #[test]
    fn test_blank_data_file_falls_back() {
        let config = CatalogConfig {
            data_file: "  ".to_string(),
            ..Default::default()
        };
        assert_eq!(config.data_file(), "catalog.json");
    }

    #[test]
    fn test_toml_overrides_single_key() {
        let config: CatalogConfig = toml::from_str(
            r#"
            data_file = "shop.json"
            lock_stale_after_secs = 5
            conflict_retries = 0
            "#,
        )
        .unwrap();
        assert_eq!(config.data_file(), "shop.json");
        assert_eq!(config.lock_stale_after(), Duration::from_secs(5));
        assert_eq!(config.conflict_retries, 0);
    }

    #[test]
    fn test_serializes_back_to_toml() {
        let text = toml::to_string(&CatalogConfig::default()).unwrap();
        assert!(text.contains("data_file = \"catalog.json\""));
        assert!(text.contains("conflict_retries = 3"));
    }
}
