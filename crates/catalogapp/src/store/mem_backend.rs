use super::backend::{Snapshot, StorageBackend};
use crate::error::{CatalogError, Result};
use parking_lot::Mutex;
use std::path::PathBuf;

#[derive(Default)]
struct MemState {
    snapshot: Snapshot,
    simulate_write_error: bool,
}

/// In-memory storage backend for tests.
///
/// The snapshot sits behind a `parking_lot::Mutex` so one store can be driven from
/// several threads, which is how commit races are exercised.
#[derive(Default)]
pub struct MemBackend {
    state: Mutex<MemState>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.state.lock().simulate_write_error = simulate;
    }

    pub fn revision(&self) -> u64 {
        self.state.lock().snapshot.revision
    }
}

impl StorageBackend for MemBackend {
    fn load(&self) -> Result<Snapshot> {
        Ok(self.state.lock().snapshot.clone())
    }

    fn store(&self, expected_revision: u64, snapshot: &Snapshot) -> Result<()> {
        let mut state = self.state.lock();
        if state.simulate_write_error {
            return Err(CatalogError::Store("Simulated write error".to_string()));
        }
        if state.snapshot.revision != expected_revision {
            return Err(CatalogError::Conflict(format!(
                "store moved to revision {} since revision {} was read",
                state.snapshot.revision, expected_revision
            )));
        }
        state.snapshot = snapshot.clone();
        Ok(())
    }

    fn location(&self) -> PathBuf {
        PathBuf::from("memory://catalog")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn next(snapshot: &Snapshot) -> Snapshot {
        Snapshot {
            revision: snapshot.revision + 1,
            ..snapshot.clone()
        }
    }

    #[test]
    fn fresh_backend_is_revision_zero() {
        let backend = MemBackend::new();
        let snapshot = backend.load().unwrap();
        assert_eq!(snapshot.revision, 0);
        assert!(snapshot.committed_at.is_none());
    }

    #[test]
    fn store_with_stale_revision_conflicts() {
        let backend = MemBackend::new();
        let base = backend.load().unwrap();
        backend.store(0, &next(&base)).unwrap();
        assert_eq!(backend.revision(), 1);

        let err = backend.store(0, &next(&base)).unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(backend.revision(), 1);
    }

    #[test]
    fn simulated_write_error_is_not_a_conflict() {
        let backend = MemBackend::new();
        backend.set_simulate_write_error(true);
        let err = backend.store(0, &Snapshot::default()).unwrap_err();
        assert!(matches!(err, CatalogError::Store(_)));
        backend.set_simulate_write_error(false);
        backend.store(0, &Snapshot::default()).unwrap();
    }
}
