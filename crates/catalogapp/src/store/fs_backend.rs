use super::backend::{Snapshot, StorageBackend};
use crate::error::{CatalogError, Result};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use uuid::Uuid;

pub const DEFAULT_DATA_FILE: &str = "catalog.json";
pub const DEFAULT_LOCK_STALE_AFTER: Duration = Duration::from_secs(30);
const LOCK_ATTEMPTS: usize = 3;

/// Stores the catalog as one JSON document inside a data directory.
///
/// ```text
/// <root>/
/// ├── catalog.json        # current snapshot
/// ├── catalog.json.lock   # present while a writer swaps the snapshot
/// └── catalog.toml        # optional configuration
/// ```
pub struct FsBackend {
    root: PathBuf,
    data_file: String,
    lock_stale_after: Duration,
}

impl FsBackend {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            data_file: DEFAULT_DATA_FILE.to_string(),
            lock_stale_after: DEFAULT_LOCK_STALE_AFTER,
        }
    }

    pub fn with_data_file(mut self, name: &str) -> Self {
        self.data_file = name.to_string();
        self
    }

    pub fn with_lock_stale_after(mut self, stale_after: Duration) -> Self {
        self.lock_stale_after = stale_after;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn data_path(&self) -> PathBuf {
        self.root.join(&self.data_file)
    }

    fn lock_path(&self) -> PathBuf {
        self.root.join(format!("{}.lock", self.data_file))
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(CatalogError::Io)?;
        }
        Ok(())
    }

    fn locked(&self) -> CatalogError {
        CatalogError::Conflict(format!(
            "{} is locked by another writer",
            self.data_path().display()
        ))
    }

    /// Takes the writer lock. A live lock held by someone else is a `Conflict`; a
    /// lock that vanishes between attempts is simply tried again.
    fn acquire_lock(&self) -> Result<LockGuard> {
        let path = self.lock_path();
        for _ in 0..LOCK_ATTEMPTS {
            match try_create_lock(&path) {
                Ok(guard) => return Ok(guard),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
                Err(e) => return Err(CatalogError::Io(e)),
            }

            let Some(age) = lock_age(&path) else {
                continue;
            };
            if age <= self.lock_stale_after {
                return Err(self.locked());
            }
            tracing::warn!(lock = %path.display(), "breaking stale writer lock");
            match fs::remove_file(&path) {
                Ok(()) => {}
                // Another writer broke or released it first.
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(CatalogError::Io(e)),
            }
        }
        Err(self.locked())
    }
}

/// Age of the lock file at `path`, or `None` once it is gone.
fn lock_age(path: &Path) -> Option<Duration> {
    let modified = fs::metadata(path).and_then(|m| m.modified()).ok()?;
    Some(
        SystemTime::now()
            .duration_since(modified)
            .unwrap_or(Duration::ZERO),
    )
}

/// Removes the lock file when dropped.
struct LockGuard {
    path: PathBuf,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

fn try_create_lock(path: &Path) -> std::io::Result<LockGuard> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    let guard = LockGuard {
        path: path.to_path_buf(),
    };
    writeln!(file, "{}", std::process::id())?;
    Ok(guard)
}

/// Writes `content` to a temp file in `root` and renames it over `target`. The temp
/// file never outlives a failed write.
fn write_atomically(root: &Path, target: &Path, content: &str) -> Result<()> {
    let tmp_file = root.join(format!(".catalog-{}.tmp", Uuid::new_v4()));
    let written = fs::write(&tmp_file, content).and_then(|()| fs::rename(&tmp_file, target));
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp_file);
        return Err(CatalogError::Io(e));
    }
    Ok(())
}

impl StorageBackend for FsBackend {
    fn load(&self) -> Result<Snapshot> {
        let data_file = self.data_path();
        if !data_file.exists() {
            return Ok(Snapshot::default());
        }
        let content = fs::read_to_string(data_file).map_err(CatalogError::Io)?;
        let snapshot: Snapshot =
            serde_json::from_str(&content).map_err(CatalogError::Serialization)?;
        Ok(snapshot)
    }

    fn store(&self, expected_revision: u64, snapshot: &Snapshot) -> Result<()> {
        self.ensure_dir()?;
        let _lock = self.acquire_lock()?;

        let current = self.load()?;
        if current.revision != expected_revision {
            return Err(CatalogError::Conflict(format!(
                "store moved to revision {} since revision {} was read",
                current.revision, expected_revision
            )));
        }

        let content = serde_json::to_string_pretty(snapshot).map_err(CatalogError::Serialization)?;

        write_atomically(&self.root, &self.data_path(), &content)
    }

    fn location(&self) -> PathBuf {
        self.data_path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn bumped(snapshot: &Snapshot) -> Snapshot {
        Snapshot {
            revision: snapshot.revision + 1,
            ..snapshot.clone()
        }
    }

    #[test]
    fn missing_data_file_loads_empty_snapshot() {
        let dir = tempdir().unwrap();
        let backend = FsBackend::new(dir.path().join("nested"));
        assert_eq!(backend.load().unwrap(), Snapshot::default());
    }

    #[test]
    fn store_creates_directory_and_leaves_no_lock_or_tmp() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("data");
        let backend = FsBackend::new(root.clone()).with_data_file("shop.json");

        backend.store(0, &bumped(&Snapshot::default())).unwrap();

        let names: Vec<String> = fs::read_dir(&root)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["shop.json".to_string()]);
        assert_eq!(backend.load().unwrap().revision, 1);
        assert_eq!(backend.location(), root.join("shop.json"));
    }

    #[test]
    fn stale_revision_is_a_conflict() {
        let dir = tempdir().unwrap();
        let backend = FsBackend::new(dir.path().to_path_buf());
        let base = backend.load().unwrap();
        backend.store(0, &bumped(&base)).unwrap();

        let err = backend.store(0, &bumped(&base)).unwrap_err();
        assert!(matches!(err, CatalogError::Conflict(_)));
    }

    #[test]
    fn live_lock_is_a_conflict() {
        let dir = tempdir().unwrap();
        let backend = FsBackend::new(dir.path().to_path_buf());
        fs::write(dir.path().join("catalog.json.lock"), "4242").unwrap();

        let err = backend.store(0, &bumped(&Snapshot::default())).unwrap_err();
        assert!(err.is_retryable());
        assert!(dir.path().join("catalog.json.lock").exists());
    }

    #[test]
    fn stale_lock_is_broken() {
        let dir = tempdir().unwrap();
        let backend =
            FsBackend::new(dir.path().to_path_buf()).with_lock_stale_after(Duration::ZERO);
        fs::write(dir.path().join("catalog.json.lock"), "4242").unwrap();
        std::thread::sleep(Duration::from_millis(20));

        backend.store(0, &bumped(&Snapshot::default())).unwrap();
        assert_eq!(backend.load().unwrap().revision, 1);
        assert!(!dir.path().join("catalog.json.lock").exists());
    }

    #[test]
    fn failed_rename_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("catalog.json");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep"), "x").unwrap();

        let err = write_atomically(dir.path(), &target, "{}").unwrap_err();
        assert!(matches!(err, CatalogError::Io(_)));

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["catalog.json".to_string()]);
    }

    #[test]
    fn writers_racing_for_the_lock_only_ever_see_conflicts() {
        let dir = tempdir().unwrap();
        let backend = FsBackend::new(dir.path().to_path_buf());

        for _ in 0..50 {
            let base = backend.load().unwrap();
            let errors: Vec<CatalogError> = std::thread::scope(|s| {
                let handles: Vec<_> = (0..8)
                    .map(|_| s.spawn(|| backend.store(base.revision, &bumped(&base))))
                    .collect();
                handles
                    .into_iter()
                    .filter_map(|h| h.join().unwrap().err())
                    .collect()
            });
            let odd: Vec<String> = errors
                .iter()
                .filter(|e| !e.is_retryable())
                .map(|e| e.to_string())
                .collect();
            assert!(odd.is_empty(), "non-retryable errors: {odd:?}");
            assert!(errors.len() < 8);
        }
        assert!(!dir.path().join("catalog.json.lock").exists());
    }
}
