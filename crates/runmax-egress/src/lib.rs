//! RunMax Egress
//!
//! This crate provides everything that talks to the outside world on behalf
//! of the summary service:
//! - Shared HTTP client construction and retry policy
//! - Text-generation connector
//! - Summary strategies and the ordered fallback chain

pub mod client;
pub mod strategy;
pub mod text_generation;

pub use client::HttpClientConfig;
pub use strategy::{
    RemoteStrategy, SortedListStrategy, SummaryChain, SummaryChainBuilder, SummaryStrategy,
    TerminalFallback,
};
pub use text_generation::{TextGenerationClient, TextGenerationConfig};

use thiserror::Error;

/// Egress error types
#[derive(Debug, Error)]
pub enum EgressError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Provider error ({status_code}): {message}")]
    ProviderError { status_code: u16, message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Request timeout after {0}s")]
    Timeout(u64),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Rate limit exceeded{}", retry_after_secs.map(|s| format!(": retry after {}s", s)).unwrap_or_default())]
    RateLimitExceeded { retry_after_secs: Option<u64> },
}

/// Egress result type
pub type Result<T> = std::result::Result<T, EgressError>;
