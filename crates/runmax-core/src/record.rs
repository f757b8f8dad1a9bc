//! Stored record type
//!
//! Field names on the wire match the persisted JSON document:
//! `input`, `output`, `timestamp`, `llm_response`, `llm_timestamp`.
//!
//! Timestamps are written as RFC 3339. On read, offset-less ISO 8601 values
//! (`2024-05-01T12:00:00.123456`) are accepted too and taken as UTC, so
//! documents written by older deployments still load.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de::Error as _};

use crate::extractor::extract_max_runs;

/// One processed input line plus its optional summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    /// Tokens parsed from the input line
    pub input: Vec<String>,

    /// Max-run extraction result for `input`
    pub output: Vec<String>,

    /// When the record was created
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,

    /// Summary text produced for `output`
    #[serde(
        rename = "llm_response",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub summary: Option<String>,

    /// When the summary was produced
    #[serde(
        rename = "llm_timestamp",
        default,
        deserialize_with = "deserialize_optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub summary_timestamp: Option<DateTime<Utc>>,
}

impl StoredRecord {
    /// Run the extractor over `input` and stamp the record with the current time
    pub fn from_input(input: Vec<String>) -> Self {
        Self::from_input_at(input, Utc::now())
    }

    /// Same as [`StoredRecord::from_input`] with an explicit creation time
    pub fn from_input_at(input: Vec<String>, timestamp: DateTime<Utc>) -> Self {
        let output = extract_max_runs(&input);
        Self {
            input,
            output,
            timestamp,
            summary: None,
            summary_timestamp: None,
        }
    }

    /// Attach a summary, replacing any previous one
    pub fn set_summary(&mut self, summary: impl Into<String>) {
        self.summary = Some(summary.into());
        self.summary_timestamp = Some(Utc::now());
    }
}

/// Parse RFC 3339, falling back to a naive ISO 8601 timestamp read as UTC
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp '{}'", raw)))
}

fn deserialize_optional_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid timestamp '{}'", raw))),
        None => Ok(None),
    }
}
