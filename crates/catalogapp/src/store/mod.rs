//! # Storage Layer
//!
//! This module defines the storage abstraction for the catalog. The [`DataStore`]
//! trait lets the application work with different storage backends.
//!
//! ## Snapshot Model
//!
//! The whole catalog is one [`Snapshot`]: every table plus a revision number. A write
//! operation works like this:
//!
//! 1. [`DataStore::begin`] loads the current snapshot into a [`Transaction`].
//! 2. The operation reads and writes the transaction's private working copy. All
//!    reference, uniqueness and delete-policy checks run against it.
//! 3. [`DataStore::commit`] hands the working copy back. It is stored only if nobody
//!    else committed since step 1; otherwise the commit fails with
//!    `CatalogError::Conflict` and nothing is written.
//!
//! First committer wins. The loser re-runs the whole operation on a fresh snapshot,
//! which is what makes read-max-then-write ordinal assignment and check-then-insert
//! validation safe between concurrent writers.
//!
//! Nothing is cached between operations: each `begin` re-reads the backend.
//!
//! ## Implementations
//!
//! - [`fs::FileStore`]: durable JSON storage in a data directory.
//! - [`memory::InMemoryStore`]: for testing logic without filesystem I/O.
//!
//! ## Storage Layout
//!
//! ```text
//! <data dir>/
//! ├── catalog.json        # Snapshot: revision, committed_at, tables
//! ├── catalog.json.lock   # Writer lock, only present during a commit
//! └── catalog.toml        # Optional configuration
//! ```

use crate::error::Result;
use std::path::PathBuf;

pub mod backend;
pub mod catalog_store;
pub mod fs;
pub mod fs_backend;
pub mod mem_backend;
pub mod memory;
mod records;
pub mod tables;
pub mod transaction;

pub use backend::{Snapshot, StorageBackend};
pub use catalog_store::CatalogStore;
pub use fs::FileStore;
pub use memory::InMemoryStore;
pub use tables::{Record, Table, Tables, UniqueKey};
pub use transaction::{DeleteReport, Nullified, RecordRef, Transaction};

#[cfg(any(test, feature = "test_utils"))]
pub use memory::fixtures;

/// Abstract interface for catalog storage.
///
/// Implementations must be safe to share: `begin` and `commit` take `&self` and may
/// be called from several threads at once.
pub trait DataStore {
    /// Start a transaction on the latest committed snapshot.
    fn begin(&self) -> Result<Transaction>;

    /// Persist the transaction's writes and return the new revision.
    ///
    /// A transaction without writes is not stored; its base revision is returned.
    /// Fails with `Conflict` if another commit landed since `begin`.
    fn commit(&self, txn: Transaction) -> Result<u64>;

    /// Where the data lives, for diagnostics.
    fn location(&self) -> PathBuf;
}
