//! Summary strategies
//!
//! A [`SummaryChain`] tries each [`SummaryStrategy`] in order and returns the
//! first success. When every strategy fails, the [`TerminalFallback`] builds
//! the answer; it cannot fail, so the chain always yields a string.
//!
//! ```rust
//! use runmax_egress::{SortedListStrategy, SummaryChain};
//! use runmax_core::Summarizer;
//!
//! # async fn example() {
//! let chain = SummaryChain::builder()
//!     .strategy(SortedListStrategy)
//!     .build();
//!
//! let text = chain.summarize(&["b".to_string(), "a".to_string()]).await;
//! assert_eq!(text, "LLM Response: Sorted alphabetically: ['a', 'b']");
//! # }
//! ```

use crate::text_generation::{TextGenerationClient, TextGenerationConfig};
use crate::{EgressError, Result};
use async_trait::async_trait;
use runmax_core::Summarizer;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One way of producing a summary; may fail
#[async_trait]
pub trait SummaryStrategy: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Describe `items`
    async fn summarize(&self, items: &[String]) -> Result<String>;
}

/// Render items the way a Python list of strings prints: `['a', 'b']`
pub fn format_items(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|item| quote_item(item)).collect();
    format!("[{}]", quoted.join(", "))
}

/// Python `repr` quoting: single quotes unless the text contains `'` and no `"`
fn quote_item(item: &str) -> String {
    let quote = if item.contains('\'') && !item.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(item.len() + 2);
    out.push(quote);
    for c in item.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Asks a remote text-generation endpoint to sort and present the items
pub struct RemoteStrategy {
    client: TextGenerationClient,
}

impl RemoteStrategy {
    /// Wrap an existing client
    pub fn new(client: TextGenerationClient) -> Self {
        Self { client }
    }

    fn prompt(items: &[String]) -> String {
        format!(
            "Sort the following list alphabetically and reply with the sorted list only: {}",
            format_items(items)
        )
    }
}

#[async_trait]
impl SummaryStrategy for RemoteStrategy {
    fn name(&self) -> &str {
        "remote"
    }

    async fn summarize(&self, items: &[String]) -> Result<String> {
        let text = self.client.generate(&Self::prompt(items)).await?;
        Ok(format!("LLM Response: {}", text))
    }
}

/// Local stand-in that sorts the items and phrases the result
#[derive(Debug, Clone, Copy, Default)]
pub struct SortedListStrategy;

impl SortedListStrategy {
    /// Build the description without going through the trait
    pub fn describe(items: &[String]) -> String {
        let mut sorted = items.to_vec();
        sorted.sort();

        match sorted.as_slice() {
            [] => "LLM Response: The list is empty, so no sorting is needed.".to_string(),
            [only] => format!("LLM Response: Single item '{}' is already in correct order.", only),
            _ => format!("LLM Response: Sorted alphabetically: {}", format_items(&sorted)),
        }
    }
}

#[async_trait]
impl SummaryStrategy for SortedListStrategy {
    fn name(&self) -> &str {
        "sorted-list"
    }

    async fn summarize(&self, items: &[String]) -> Result<String> {
        Ok(Self::describe(items))
    }
}

/// Last resort when every strategy failed
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalFallback;

impl TerminalFallback {
    /// Build a summary that reports the failure and still names the items
    pub fn summarize(&self, items: &[String], last_error: Option<&EgressError>) -> String {
        let reason = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no summary strategy available".to_string());
        format!(
            "Error processing LLM request: {}. Items: {}",
            reason,
            format_items(items)
        )
    }
}

/// Ordered list of strategies with an infallible tail
pub struct SummaryChain {
    strategies: Vec<Arc<dyn SummaryStrategy>>,
    terminal: TerminalFallback,
}

impl SummaryChain {
    /// Start building a chain
    pub fn builder() -> SummaryChainBuilder {
        SummaryChainBuilder::default()
    }

    /// Standard chain: remote generation (when an endpoint is set), then the
    /// local sorted-list description
    pub fn from_config(config: &TextGenerationConfig) -> Result<Self> {
        let mut builder = Self::builder();

        if config.endpoint.is_some() {
            let client = TextGenerationClient::new(config.clone())?;
            info!("Remote text generation enabled: {}", client.endpoint());
            builder = builder.strategy(RemoteStrategy::new(client));
        } else {
            info!("No text generation endpoint configured, using local summaries");
        }

        Ok(builder.strategy(SortedListStrategy).build())
    }

    /// Names of the fallible strategies, in order
    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }
}

#[async_trait]
impl Summarizer for SummaryChain {
    async fn summarize(&self, items: &[String]) -> String {
        let mut last_error = None;

        for strategy in &self.strategies {
            match strategy.summarize(items).await {
                Ok(text) => {
                    debug!("Summary produced by '{}'", strategy.name());
                    return text;
                }
                Err(e) => {
                    warn!("Summary strategy '{}' failed: {}", strategy.name(), e);
                    last_error = Some(e);
                }
            }
        }

        self.terminal.summarize(items, last_error.as_ref())
    }
}

/// Builder for [`SummaryChain`]
#[derive(Default)]
pub struct SummaryChainBuilder {
    strategies: Vec<Arc<dyn SummaryStrategy>>,
}

impl SummaryChainBuilder {
    /// Append a strategy; strategies run in insertion order
    pub fn strategy(mut self, strategy: impl SummaryStrategy + 'static) -> Self {
        self.strategies.push(Arc::new(strategy));
        self
    }

    /// Finish the chain
    pub fn build(self) -> SummaryChain {
        SummaryChain {
            strategies: self.strategies,
            terminal: TerminalFallback,
        }
    }
}
