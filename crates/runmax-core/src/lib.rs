//! RunMax Core Types and Traits
//!
//! This crate provides the fundamental types and traits used throughout RunMax:
//! - The max-run extraction algorithm
//! - Stored record types
//! - Record store and summarizer abstractions
//! - Ingestion and summary services
//! - Core error types

pub mod error;
pub mod extractor;
pub mod ingest;
pub mod record;
pub mod store;
pub mod summarizer;
pub mod summary;

pub use error::{Error, Result};
pub use extractor::{Run, extract_max_runs, runs};
pub use ingest::{IngestionService, parse_line};
pub use record::StoredRecord;
pub use store::{RecordStore, StoreHandle};
pub use summarizer::Summarizer;
pub use summary::{SummaryOutcome, SummaryService};
