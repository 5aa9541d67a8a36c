//! URL audit records, verdicts and the persisted report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A URL found in the feed and where it was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRecord {
    pub url: String,
    /// Structural location, e.g. `categories[2].items[17].rom`
    pub location_path: String,
}

impl UrlRecord {
    pub fn new(url: impl Into<String>, location_path: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            location_path: location_path.into(),
        }
    }
}

/// Liveness classification of one URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Valid,
    Invalid,
}

/// Why an invalid URL failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckFailure {
    MalformedUrl,
    Network,
    Timeout,
    HttpStatus,
}

/// Result of checking a single URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckVerdict {
    pub record: UrlRecord,
    pub outcome: Outcome,
    pub status_code: Option<u16>,
    pub failure: Option<CheckFailure>,
    pub error_detail: Option<String>,
}

impl CheckVerdict {
    pub fn valid(record: UrlRecord, status_code: u16) -> Self {
        Self {
            record,
            outcome: Outcome::Valid,
            status_code: Some(status_code),
            failure: None,
            error_detail: None,
        }
    }

    pub fn invalid(
        record: UrlRecord,
        failure: CheckFailure,
        status_code: Option<u16>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            record,
            outcome: Outcome::Invalid,
            status_code,
            failure: Some(failure),
            error_detail: Some(detail.into()),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.outcome == Outcome::Valid
    }
}

/// One entry of the invalid URL list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidEntry {
    pub path: String,
    pub url: String,
    pub error: String,
}

/// Aggregate counts of an audit run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub success_rate_percent: f64,
}

/// Full audit report, written once per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub timestamp: DateTime<Utc>,
    pub summary: ReportSummary,
    pub invalid_urls: Vec<InvalidEntry>,
}
