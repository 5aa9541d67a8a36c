//! Service layer for the feed pipeline.
//!
//! This module contains the business logic for:
//! - Forbidden key rewriting (`KeySanitizer`)
//! - Resource URL extraction (`extract_urls`)
//! - URL liveness checking (`UrlChecker`)
//! - Audit reporting (`reporter`)
//! - Chunked publishing (`ChunkedUploader`)

pub mod checker;
pub mod extractor;
pub mod reporter;
pub mod sanitizer;
pub mod uploader;

pub use checker::UrlChecker;
pub use extractor::extract_urls;
pub use sanitizer::{KeySanitizer, RewriteCount, SanitizeOutcome};
pub use uploader::ChunkedUploader;
