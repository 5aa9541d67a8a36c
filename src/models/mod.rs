// src/models/mod.rs

//! Domain models for the feed pipeline.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
pub mod feed;
mod upload;
mod verdict;

// Re-export all public types
pub use config::{
    CheckerConfig, Config, PathsConfig, RewriteRule, SanitizeConfig, StoreConfig, UploadConfig,
};
pub use feed::FeedStats;
pub use upload::{UnitKind, UploadFailure, UploadOutcome, UploadUnit, WriteMode};
pub use verdict::{
    CheckFailure, CheckVerdict, InvalidEntry, Outcome, ReportSummary, UrlRecord,
    ValidationReport,
};
