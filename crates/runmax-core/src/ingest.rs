//! Ingestion of uploaded bracket-list text
//!
//! Each line of the form `[a, b, c]` becomes one [`StoredRecord`]. Lines that
//! are not bracket-delimited, or whose brackets enclose nothing, are skipped.

use tracing::{debug, info};

use crate::{Result, StoreHandle, StoredRecord};

/// Parse one line into its symbols
///
/// Returns `None` for lines that do not qualify: anything not wrapped in
/// `[` and `]` after trimming, and `[]`.
///
/// ```rust
/// use runmax_core::parse_line;
///
/// assert_eq!(
///     parse_line("  [a, b ,c]  "),
///     Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
/// );
/// assert_eq!(parse_line("[]"), None);
/// assert_eq!(parse_line("a, b"), None);
/// ```
pub fn parse_line(line: &str) -> Option<Vec<String>> {
    let line = line.trim();
    let content = line.strip_prefix('[')?.strip_suffix(']')?;

    if content.is_empty() {
        return None;
    }

    Some(
        content
            .split(',')
            .map(|item| item.trim().to_string())
            .collect(),
    )
}

/// Parse every qualifying line of `text` into a fresh record
pub fn parse_records(text: &str) -> Vec<StoredRecord> {
    text.lines()
        .filter_map(parse_line)
        .map(StoredRecord::from_input)
        .collect()
}

/// Turns uploaded text into stored records
#[derive(Clone)]
pub struct IngestionService {
    store: StoreHandle,
}

impl IngestionService {
    /// Create a new ingestion service
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    /// Parse `text`, persist the new records and return them
    ///
    /// Malformed lines are skipped. Only storage failures are errors.
    pub async fn ingest(&self, text: &str) -> Result<Vec<StoredRecord>> {
        let created = parse_records(text);

        for record in &created {
            debug!(input = ?record.input, output = ?record.output, "Parsed record");
        }

        let appended = created.clone();
        self.store
            .update(move |records| {
                records.extend(appended);
                Ok(())
            })
            .await?;

        info!("Ingested {} records", created.len());
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::VecStore;
    use std::sync::Arc;

    fn service() -> (IngestionService, StoreHandle) {
        let handle = StoreHandle::new(Arc::new(VecStore::default()));
        (IngestionService::new(handle.clone()), handle)
    }

    #[test]
    fn test_parse_line_trims_tokens() {
        assert_eq!(
            parse_line("[ r, r ,a ]"),
            Some(vec!["r".to_string(), "r".to_string(), "a".to_string()])
        );
    }

    #[test]
    fn test_parse_line_rejects_unbracketed() {
        assert_eq!(parse_line("a,b,c"), None);
        assert_eq!(parse_line("[a,b,c"), None);
        assert_eq!(parse_line("a,b,c]"), None);
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("["), None);
        assert_eq!(parse_line("]"), None);
    }

    #[test]
    fn test_parse_line_skips_empty_brackets() {
        assert_eq!(parse_line("[]"), None);
        assert_eq!(parse_line("   []   "), None);
    }

    #[test]
    fn test_parse_line_whitespace_interior_is_one_empty_token() {
        assert_eq!(parse_line("[ ]"), Some(vec![String::new()]));
    }

    #[test]
    fn test_parse_line_keeps_empty_tokens() {
        assert_eq!(
            parse_line("[a,,b]"),
            Some(vec!["a".to_string(), String::new(), "b".to_string()])
        );
    }

    #[test]
    fn test_parse_records_one_per_valid_line() {
        let text = "[a,a]\nnot a list\n[]\n\n[x, y, y]\r\n";
        let records = parse_records(text);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].output, vec!["a".to_string()]);
        assert_eq!(records[1].input, vec!["x", "y", "y"]);
        assert_eq!(records[1].output, vec!["y".to_string()]);
    }

    #[tokio::test]
    async fn test_ingest_persists_new_records() {
        let (service, handle) = service();

        let created = service.ingest("[a,a,b,b]\n[a,b]\n").await.unwrap();
        assert_eq!(created.len(), 2);
        assert_eq!(created[0].output, vec!["a".to_string(), "b".to_string()]);
        assert!(created[1].output.is_empty());

        let stored = handle.load().await.unwrap();
        assert_eq!(stored, created);
    }

    #[tokio::test]
    async fn test_ingest_appends_and_truncates() {
        let (service, handle) = service();

        service.ingest("[1,1]\n[2,2]\n[3,3]\n").await.unwrap();
        let created = service.ingest("[4,4]\n[5,5]\n[6,6]\n[7,7]\n").await.unwrap();

        // Every record from the upload is returned even though only 5 are kept
        assert_eq!(created.len(), 4);

        let stored = handle.load().await.unwrap();
        let inputs: Vec<_> = stored.iter().map(|r| r.input[0].clone()).collect();
        assert_eq!(inputs, vec!["3", "4", "5", "6", "7"]);
    }

    #[tokio::test]
    async fn test_ingest_without_valid_lines() {
        let (service, handle) = service();

        let created = service.ingest("hello\n[]\n").await.unwrap();
        assert!(created.is_empty());
        assert!(handle.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ingest_storage_failure() {
        let store = VecStore {
            fail_load: true,
            ..Default::default()
        };
        let service = IngestionService::new(StoreHandle::new(Arc::new(store)));

        let result = service.ingest("[a,a]").await;
        assert!(matches!(result, Err(crate::Error::Storage(_))));
    }
}
