//! Summary of the most recent record

use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::{Error, Result, StoreHandle, Summarizer};

/// Result of summarizing the latest record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryOutcome {
    /// Text produced by the summarizer
    pub summary: String,
    /// The extraction output that was summarized
    pub original_data: Vec<String>,
}

/// Summarizes the newest stored record and writes the summary back
#[derive(Clone)]
pub struct SummaryService {
    store: StoreHandle,
    summarizer: Arc<dyn Summarizer>,
}

impl SummaryService {
    /// Create a new summary service
    pub fn new(store: StoreHandle, summarizer: Arc<dyn Summarizer>) -> Self {
        Self { store, summarizer }
    }

    /// Summarize the most recent record's output
    ///
    /// # Errors
    /// - `Error::NoData` if nothing has been stored yet
    /// - `Error::Storage` if the store cannot be read or written
    pub async fn summarize_latest(&self) -> Result<SummaryOutcome> {
        let target = self.store.load().await?.pop().ok_or(Error::NoData)?;
        let original_data = target.output.clone();

        // The summarizer may wait on the network, so it runs outside the store lock
        let summary = self.summarizer.summarize(&original_data).await;

        // Newer uploads may have landed meanwhile; annotate the record we summarized
        let text = summary.clone();
        let updated = self
            .store
            .update(move |records| {
                let found = records
                    .iter_mut()
                    .rev()
                    .find(|r| r.timestamp == target.timestamp && r.input == target.input);
                Ok(found.map(|record| record.set_summary(text)).is_some())
            })
            .await?;

        if !updated {
            warn!("Summarized record was evicted before the summary could be stored");
        }

        info!("Stored summary for {} items", original_data.len());

        Ok(SummaryOutcome {
            summary,
            original_data,
        })
    }
}
