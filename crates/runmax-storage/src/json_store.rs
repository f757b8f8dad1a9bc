//! JSON document record store
//!
//! All retained records live in one pretty-printed JSON array. Every save
//! replaces the whole document.

use crate::atomic_writer::AtomicWriter;
use crate::error::{StorageError, StorageResult};
use async_trait::async_trait;
use runmax_core::store::retain_latest;
use runmax_core::{RecordStore, StoredRecord};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Record store backed by a single JSON file
pub struct JsonFileStore {
    path: PathBuf,
    max_records: usize,
}

impl JsonFileStore {
    /// Create a store for `path` that keeps at most `max_records`
    pub fn new<P: AsRef<Path>>(path: P, max_records: usize) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            max_records,
        }
    }

    /// Path of the backing document
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_records(&self) -> StorageResult<Vec<StoredRecord>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::Io(e)),
        };

        serde_json::from_str(&content).map_err(|e| {
            StorageError::InvalidData(format!("{}: {}", self.path.display(), e))
        })
    }

    fn write_records(&self, records: &[StoredRecord]) -> StorageResult<()> {
        let kept = retain_latest(records, self.max_records);
        let content = serde_json::to_string_pretty(kept)
            .map_err(|e| StorageError::Serialization(format!("Failed to serialize records: {}", e)))?;

        let mut writer = AtomicWriter::new(&self.path)?;
        writer.write(content.as_bytes())?;
        writer.commit()?;

        debug!(
            "Saved {} of {} records to {}",
            kept.len(),
            records.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[async_trait]
impl RecordStore for JsonFileStore {
    async fn load(&self) -> runmax_core::Result<Vec<StoredRecord>> {
        Ok(self.read_records()?)
    }

    async fn save(&self, records: &[StoredRecord]) -> runmax_core::Result<()> {
        Ok(self.write_records(records)?)
    }

    fn capacity(&self) -> usize {
        self.max_records
    }
}
