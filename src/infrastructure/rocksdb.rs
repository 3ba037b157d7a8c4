use crate::domain::ports::LocalStore;
use crate::error::{CheckoutError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;

/// Column family holding the app's local key-value records.
pub const CF_RECORDS: &str = "records";

/// A persistent local store backed by RocksDB, for installations where
/// the subscription record must survive process restarts.
///
/// `Clone` shares the underlying `Arc<DB>`.
#[derive(Clone)]
pub struct RocksDbStore {
    db: Arc<DB>,
}

impl RocksDbStore {
    /// Opens or creates the database at `path`, ensuring the records
    /// column family exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_records = ColumnFamilyDescriptor::new(CF_RECORDS, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_records])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self) -> Result<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(CF_RECORDS)
            .ok_or_else(|| CheckoutError::Store("records column family not found".to_string()))
    }
}

#[async_trait]
impl LocalStore for RocksDbStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let cf = self.cf()?;
        match self.db.get_cf(cf, key.as_bytes())? {
            Some(bytes) => {
                let value = String::from_utf8(bytes)
                    .map_err(|e| CheckoutError::Store(format!("non-utf8 value: {e}")))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let cf = self.cf()?;
        self.db.put_cf(cf, key.as_bytes(), value.as_bytes())?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let cf = self.cf()?;
        self.db.delete_cf(cf, key.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_open_creates_column_family() {
        let dir = tempdir().unwrap();
        let store = RocksDbStore::open(dir.path()).expect("failed to open RocksDB");
        assert!(store.db.cf_handle(CF_RECORDS).is_some());
    }

    #[tokio::test]
    async fn test_set_get_remove() {
        let dir = tempdir().unwrap();
        let store = RocksDbStore::open(dir.path()).unwrap();

        assert!(store.get("missing").await.unwrap().is_none());

        store.set("k", "v1").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v1"));

        store.remove("k").await.unwrap();
        assert!(store.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = tempdir().unwrap();
        {
            let store = RocksDbStore::open(dir.path()).unwrap();
            store.set("k", "persisted").await.unwrap();
        }
        let store = RocksDbStore::open(dir.path()).unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("persisted"));
    }
}
