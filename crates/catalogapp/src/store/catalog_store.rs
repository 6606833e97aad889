use super::backend::{Snapshot, StorageBackend};
use super::transaction::Transaction;
use super::DataStore;
use crate::error::{CatalogError, Result};
use chrono::Utc;
use std::path::PathBuf;

pub struct CatalogStore<B: StorageBackend> {
    /// The underlying storage backend.
    /// Exposed as pub(crate) for testing and internal access only.
    pub(crate) backend: B,
}

impl<B: StorageBackend> CatalogStore<B> {
    pub fn with_backend(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Latest committed snapshot, for read-only inspection.
    pub fn snapshot(&self) -> Result<Snapshot> {
        self.backend.load()
    }
}

impl<B: StorageBackend> DataStore for CatalogStore<B> {
    fn begin(&self) -> Result<Transaction> {
        Ok(Transaction::new(self.backend.load()?))
    }

    fn commit(&self, txn: Transaction) -> Result<u64> {
        let base = txn.base_revision();
        if !txn.is_dirty() {
            return Ok(base);
        }

        let snapshot = Snapshot {
            revision: base + 1,
            committed_at: Some(Utc::now()),
            tables: txn.into_tables(),
        };
        match self.backend.store(base, &snapshot) {
            Ok(()) => {
                tracing::debug!(revision = snapshot.revision, "committed");
                Ok(snapshot.revision)
            }
            Err(CatalogError::Conflict(reason)) => {
                tracing::warn!(base_revision = base, %reason, "commit lost a race");
                Err(CatalogError::Conflict(reason))
            }
            Err(e) => Err(e),
        }
    }

    fn location(&self) -> PathBuf {
        self.backend.location()
    }
}
