//! Write units and accounting for chunked publishing.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// How a unit is applied at its target path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    /// Replace whatever is at the path
    Set,
    /// Replace only the children named in the payload
    Merge,
}

/// What a unit carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnitKind {
    RootMetadata,
    CategoryMetadata {
        category: usize,
    },
    ItemChunk {
        category: usize,
        chunk: usize,
        start: usize,
        len: usize,
    },
    WholeDocument,
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootMetadata => write!(f, "feed metadata"),
            Self::CategoryMetadata { category } => write!(f, "category {category} metadata"),
            Self::ItemChunk {
                category,
                chunk,
                start,
                len,
            } => write!(
                f,
                "category {category} chunk {} (items {start}..{})",
                chunk + 1,
                start + len
            ),
            Self::WholeDocument => write!(f, "whole document"),
        }
    }
}

/// One remote write.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadUnit {
    pub target_path: String,
    pub kind: UnitKind,
    pub mode: WriteMode,
    pub payload: Value,
}

/// A write that the store rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadFailure {
    pub target_path: String,
    pub description: String,
    pub error: String,
}

/// Success/failure tally of one publish run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadOutcome {
    pub success_count: usize,
    pub failure_count: usize,
    pub failures: Vec<UploadFailure>,
}

impl UploadOutcome {
    /// Fold one write result into the tally.
    pub fn record(mut self, unit: &UploadUnit, result: Result<(), String>) -> Self {
        match result {
            Ok(()) => self.success_count += 1,
            Err(error) => {
                self.failure_count += 1;
                self.failures.push(UploadFailure {
                    target_path: unit.target_path.clone(),
                    description: unit.kind.to_string(),
                    error,
                });
            }
        }
        self
    }

    pub fn total(&self) -> usize {
        self.success_count + self.failure_count
    }

    pub fn is_clean(&self) -> bool {
        self.failure_count == 0
    }
}
