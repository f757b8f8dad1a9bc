//! Summarizer trait definitions

/// Produces a human-readable description of an extraction result.
///
/// Implementations must always return a string: failures of any remote
/// service are expected to be absorbed by local fallbacks.
#[async_trait::async_trait]
pub trait Summarizer: Send + Sync {
    /// Describe `items`
    async fn summarize(&self, items: &[String]) -> String;
}
