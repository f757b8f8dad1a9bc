//! Record store trait
//!
//! The `RecordStore` trait abstracts over where processed records live, so the
//! on-disk JSON document can be swapped for another durable store without
//! touching the services.
//!
//! # Example
//! ```no_run
//! # use runmax_core::{RecordStore, StoredRecord};
//! # async fn example(store: &dyn RecordStore) -> runmax_core::Result<()> {
//! let mut records = store.load().await?;
//! records.push(StoredRecord::from_input(vec!["a".into(), "a".into()]));
//! store.save(&records).await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::{Result, StoredRecord};

/// Durable storage for the most recent records
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Load all retained records, oldest first
    ///
    /// Returns an empty list when nothing has been saved yet.
    async fn load(&self) -> Result<Vec<StoredRecord>>;

    /// Replace the persisted records with the trailing `capacity()` entries of `records`
    async fn save(&self, records: &[StoredRecord]) -> Result<()>;

    /// Maximum number of records retained by `save`
    fn capacity(&self) -> usize;
}

/// Keep only the trailing `capacity` records
pub fn retain_latest(records: &[StoredRecord], capacity: usize) -> &[StoredRecord] {
    let skip = records.len().saturating_sub(capacity);
    &records[skip..]
}

/// Shared handle that serializes read-modify-write cycles against a store
///
/// Every service that mutates records should go through the same handle so
/// concurrent requests in one process cannot lose each other's updates.
#[derive(Clone)]
pub struct StoreHandle {
    store: Arc<dyn RecordStore>,
    lock: Arc<Mutex<()>>,
}

impl StoreHandle {
    /// Wrap a store
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Load the current records
    pub async fn load(&self) -> Result<Vec<StoredRecord>> {
        let _guard = self.lock.lock().await;
        self.store.load().await
    }

    /// Load, modify and save the records while holding the store lock
    ///
    /// Nothing is saved when `f` returns an error.
    pub async fn update<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Vec<StoredRecord>) -> Result<T> + Send,
        T: Send,
    {
        let _guard = self.lock.lock().await;
        let mut records = self.store.load().await?;
        let value = f(&mut records)?;
        self.store.save(&records).await?;
        Ok(value)
    }

    /// Underlying store
    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }
}
