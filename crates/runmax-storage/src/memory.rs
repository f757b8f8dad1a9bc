//! In-memory record store

use async_trait::async_trait;
use runmax_core::store::retain_latest;
use runmax_core::{RecordStore, StoredRecord};
use tokio::sync::RwLock;

/// Record store that keeps everything in process memory
pub struct MemoryRecordStore {
    records: RwLock<Vec<StoredRecord>>,
    max_records: usize,
}

impl MemoryRecordStore {
    /// Create an empty store that keeps at most `max_records`
    pub fn new(max_records: usize) -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            max_records,
        }
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn load(&self) -> runmax_core::Result<Vec<StoredRecord>> {
        Ok(self.records.read().await.clone())
    }

    async fn save(&self, records: &[StoredRecord]) -> runmax_core::Result<()> {
        *self.records.write().await = retain_latest(records, self.max_records).to_vec();
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.max_records
    }
}
