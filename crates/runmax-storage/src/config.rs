//! Store configuration and factory

use crate::error::{StorageError, StorageResult};
use crate::{JsonFileStore, MemoryRecordStore};
use runmax_core::RecordStore;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Which `RecordStore` implementation to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Single JSON document on disk
    #[default]
    File,
    /// Process memory, lost on restart
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" => Ok(Self::File),
            "memory" => Ok(Self::Memory),
            other => Err(format!("Unknown storage backend '{}'", other)),
        }
    }
}

/// Record store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Location of the JSON document (file backend)
    #[serde(default = "default_results_file")]
    pub results_file: PathBuf,

    /// Number of most recent records kept
    #[serde(default = "default_max_records")]
    pub max_records: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            results_file: default_results_file(),
            max_records: default_max_records(),
        }
    }
}

impl StoreConfig {
    /// Reject settings that would make the store unusable
    pub fn validate(&self) -> StorageResult<()> {
        if self.max_records == 0 {
            return Err(StorageError::InvalidConfig(
                "max_records must be at least 1".to_string(),
            ));
        }
        if self.backend == StorageBackend::File && self.results_file.as_os_str().is_empty() {
            return Err(StorageError::InvalidConfig(
                "results_file must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_results_file() -> PathBuf {
    PathBuf::from("results.json")
}

fn default_max_records() -> usize {
    5
}

/// Create a record store based on configuration
pub fn create_record_store(config: &StoreConfig) -> Arc<dyn RecordStore> {
    match config.backend {
        StorageBackend::File => {
            info!(
                "Using JSON record store at {} (keeps {} records)",
                config.results_file.display(),
                config.max_records
            );
            Arc::new(JsonFileStore::new(&config.results_file, config.max_records))
        }
        StorageBackend::Memory => {
            info!("Using in-memory record store (keeps {} records)", config.max_records);
            Arc::new(MemoryRecordStore::new(config.max_records))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.backend, StorageBackend::File);
        assert_eq!(config.results_file, PathBuf::from("results.json"));
        assert_eq!(config.max_records, 5);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: StoreConfig = serde_json::from_str(r#"{"backend": "memory"}"#).unwrap();
        assert_eq!(config.backend, StorageBackend::Memory);
        assert_eq!(config.max_records, 5);
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        assert!(StoreConfig::default().validate().is_ok());

        let config = StoreConfig {
            max_records: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_records"));

        let config = StoreConfig {
            results_file: PathBuf::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = StoreConfig {
            backend: StorageBackend::Memory,
            results_file: PathBuf::new(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("FILE".parse::<StorageBackend>().unwrap(), StorageBackend::File);
        assert_eq!("memory".parse::<StorageBackend>().unwrap(), StorageBackend::Memory);
        assert!("postgres".parse::<StorageBackend>().is_err());
    }

    #[tokio::test]
    async fn test_factory_builds_requested_backend() {
        let config = StoreConfig {
            backend: StorageBackend::Memory,
            max_records: 3,
            ..Default::default()
        };
        let store = create_record_store(&config);
        assert_eq!(store.capacity(), 3);
        assert!(store.load().await.unwrap().is_empty());
    }
}
