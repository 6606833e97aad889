use super::catalog_store::CatalogStore;
use super::fs_backend::FsBackend;
use std::path::PathBuf;
use std::time::Duration;

pub type FileStore = CatalogStore<FsBackend>;

impl FileStore {
    /// File store in `root` with the default data file name.
    pub fn open(root: PathBuf) -> Self {
        CatalogStore::with_backend(FsBackend::new(root))
    }

    pub fn open_with(root: PathBuf, data_file: &str, lock_stale_after: Duration) -> Self {
        CatalogStore::with_backend(
            FsBackend::new(root)
                .with_data_file(data_file)
                .with_lock_stale_after(lock_stale_after),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Brand;
    use crate::store::DataStore;
    use tempfile::tempdir;

    #[test]
    fn committed_writes_survive_reopen() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path().to_path_buf());
        let mut txn = store.begin().unwrap();
        let brand = Brand::new("Acme");
        txn.create(brand.clone()).unwrap();
        assert_eq!(store.commit(txn).unwrap(), 1);

        let reopened = FileStore::open(dir.path().to_path_buf());
        let txn = reopened.begin().unwrap();
        assert_eq!(txn.get::<Brand>(brand.id).unwrap().name, "Acme");
        assert_eq!(txn.base_revision(), 1);
    }

    #[test]
    fn custom_data_file_is_used() {
        let dir = tempdir().unwrap();
        let store = FileStore::open_with(
            dir.path().to_path_buf(),
            "shop.json",
            Duration::from_secs(5),
        );
        assert_eq!(store.location(), dir.path().join("shop.json"));
    }
}
