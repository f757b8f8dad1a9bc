//! Shared ingress types and the JSON error envelope

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use runmax_core::StoredRecord;
use serde::Serialize;
use thiserror::Error;

/// Request ID for tracing
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(String);

impl RequestId {
    /// Generate a new request ID
    pub fn generate() -> Self {
        Self(format!("req_{}", uuid::Uuid::new_v4().simple()))
    }

    /// Get the string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ingress error types
#[derive(Debug, Error)]
pub enum IngressError {
    /// Bad upload; the user is sent back to the page with a message
    #[error("{0}")]
    Validation(String),

    /// Nothing stored yet
    #[error("No results available to send to LLM")]
    NoData,

    /// Reading the upload or touching the store failed
    #[error("{0}")]
    Processing(String),
}

impl From<runmax_core::Error> for IngressError {
    fn from(err: runmax_core::Error) -> Self {
        match err {
            runmax_core::Error::NoData => IngressError::NoData,
            runmax_core::Error::Validation(msg) => IngressError::Validation(msg),
            other => IngressError::Processing(other.to_string()),
        }
    }
}

impl From<std::io::Error> for IngressError {
    fn from(err: std::io::Error) -> Self {
        IngressError::Processing(err.to_string())
    }
}

/// Location of the index page carrying a flash message
pub fn flash_location(message: &str) -> String {
    match serde_urlencoded::to_string([("message", message)]) {
        Ok(query) => format!("/?{}", query),
        Err(_) => "/".to_string(),
    }
}

impl IntoResponse for IngressError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            IngressError::Validation(msg) => {
                return Redirect::to(&flash_location(&msg)).into_response();
            }
            IngressError::NoData => (StatusCode::NOT_FOUND, IngressError::NoData.to_string()),
            IngressError::Processing(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        tracing::warn!(status = status.as_u16(), "Request failed: {}", message);

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

/// Ingress result type
pub type IngressResult<T> = Result<T, IngressError>;

/// `{success: false, error}`
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// Body of a successful upload
#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub results: Vec<StoredRecord>,
    pub message: String,
}

impl UploadResponse {
    pub fn new(results: Vec<StoredRecord>) -> Self {
        let message = format!("Processed {} lines successfully", results.len());
        Self {
            success: true,
            results,
            message,
        }
    }
}

/// Body of a successful summary request
#[derive(Debug, Clone, Serialize)]
pub struct SummaryResponse {
    pub success: bool,
    pub llm_response: String,
    pub original_data: Vec<String>,
}

/// Body of the history endpoint
#[derive(Debug, Clone, Serialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub results: Vec<StoredRecord>,
}
