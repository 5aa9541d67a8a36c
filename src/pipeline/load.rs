// src/pipeline/load.rs

use std::path::Path;

use serde_json::Value;

use crate::error::Result;
use crate::models::FeedStats;
use crate::utils::console;

/// A parsed feed document and its size summary.
#[derive(Debug, Clone)]
pub struct LoadedFeed {
    pub document: Value,
    pub stats: FeedStats,
}

/// Read and parse the feed document.
pub async fn load_feed(path: &Path) -> Result<LoadedFeed> {
    log::info!("Reading JSON file {}...", path.display());
    let bytes = tokio::fs::read(path).await?;
    let document: Value = serde_json::from_slice(&bytes)?;
    let stats = FeedStats::collect(&document, bytes.len());

    log::info!("JSON file loaded successfully");
    console::sub_item(&format!("File size: {:.2} MB", stats.size_mb()));
    console::sub_item(&format!("Categories: {}", stats.category_count));
    console::sub_item(&format!("Total items: {}", stats.item_count));

    Ok(LoadedFeed { document, stats })
}
