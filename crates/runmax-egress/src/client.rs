//! Shared HTTP client utilities

use crate::{EgressError, Result};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::{debug, warn};

/// Upper bound on configured retries
pub const MAX_RETRIES: u32 = 10;

/// Longest pause between two attempts
const MAX_BACKOFF_MS: u64 = 5_000;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Whole-request timeout in seconds
    pub timeout_secs: u64,

    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,

    /// Maximum number of retries for transient errors
    pub max_retries: u32,

    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            connect_timeout_secs: 5,
            max_retries: 0,
            user_agent: format!("RunMax/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Create a configured HTTP client
pub fn create_client(config: &HttpClientConfig) -> Result<Client> {
    ClientBuilder::new()
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .user_agent(&config.user_agent)
        .use_rustls_tls()
        .build()
        .map_err(|e| EgressError::ConfigError(format!("Failed to create HTTP client: {}", e)))
}

/// Whether an error is worth another attempt
fn is_retryable(err: &EgressError) -> bool {
    match err {
        EgressError::HttpError(req_err) => req_err.is_connect() || req_err.is_timeout(),
        EgressError::ProviderError { status_code, .. } => {
            matches!(status_code, 500 | 502 | 503 | 504)
        }
        EgressError::RateLimitExceeded { .. } | EgressError::Timeout(_) => true,
        _ => false,
    }
}

/// Retry policy for transient errors
pub async fn with_retry<F, Fut, T>(max_retries: u32, operation: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if is_retryable(&e) && attempt < max_retries => {
                attempt += 1;
                warn!("Request failed (attempt {}/{}): {}", attempt, max_retries + 1, e);

                let backoff_ms = backoff_ms(attempt);
                debug!("Retrying request after {}ms", backoff_ms);
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Exponential backoff for the given retry: 100ms, 200ms, 400ms, ... capped
fn backoff_ms(attempt: u32) -> u64 {
    2u64.saturating_pow(attempt.saturating_sub(1))
        .saturating_mul(100)
        .min(MAX_BACKOFF_MS)
}
