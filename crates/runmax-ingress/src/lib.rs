//! RunMax HTTP Layer
//!
//! This crate exposes the ingestion and summary services over HTTP:
//! - `GET /` upload/status page
//! - `POST /upload` bracket-list file upload
//! - `POST /llm` summary of the most recent record
//! - `GET /history` stored records
//! - `GET /healthz` liveness probe

pub mod handlers;
pub mod middleware;
pub mod types;
pub mod upload;

pub use handlers::{AppState, router};
pub use types::{IngressError, IngressResult, RequestId};
pub use upload::UploadConfig;
