use super::tables::Tables;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The unit a backend loads and stores: the whole catalog at one revision.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Bumped by one on every successful commit. An empty store is revision 0.
    #[serde(default)]
    pub revision: u64,
    #[serde(default)]
    pub committed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tables: Tables,
}

/// Abstract interface for raw storage I/O.
/// This trait handles the "how" of storage (filesystem vs memory),
/// while CatalogStore handles the "what" (transactions, revisions).
///
/// All methods take `&self`; backends handle their own interior mutability so a
/// store can be shared between threads.
pub trait StorageBackend {
    /// Load the current snapshot. A backend that never stored anything returns
    /// `Snapshot::default()`.
    fn load(&self) -> Result<Snapshot>;

    /// Replace the stored snapshot, but only if the stored revision still equals
    /// `expected_revision`. Fails with `CatalogError::Conflict` otherwise, leaving the
    /// stored data untouched.
    /// MUST be atomic (e.g. write to tmp then rename) to avoid partial writes.
    fn store(&self, expected_revision: u64, snapshot: &Snapshot) -> Result<()>;

    /// Where the data lives. For MemBackend, a virtual path.
    fn location(&self) -> PathBuf;
}
