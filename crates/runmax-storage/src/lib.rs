//! RunMax Storage
//!
//! This crate provides `RecordStore` implementations:
//! - JSON file store (single document, atomic replace)
//! - In-memory store
//! - Store factory driven by configuration

mod atomic_writer;
pub mod config;
pub mod error;
pub mod json_store;
pub mod memory;

pub use atomic_writer::AtomicWriter;
pub use config::{StorageBackend, StoreConfig, create_record_store};
pub use error::{StorageError, StorageResult};
pub use json_store::JsonFileStore;
pub use memory::MemoryRecordStore;
