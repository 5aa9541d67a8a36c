// src/pipeline/publish.rs

//! Chunked publish of the sanitized feed.

use std::path::PathBuf;

use crate::config::STORE_URL_ENV;
use crate::error::Result;
use crate::models::{Config, UploadOutcome};
use crate::services::ChunkedUploader;
use crate::storage::{LocalTreeStore, RestTreeStore, TreeStore};
use crate::utils::console;

use super::load::load_feed;

/// Open the store to publish into: a local tree file when given, else the REST store.
pub async fn open_store(config: &Config, local: Option<PathBuf>) -> Result<Box<dyn TreeStore>> {
    match local {
        Some(file) => Ok(Box::new(LocalTreeStore::open(file).await?)),
        None => {
            if config.store.is_default_url() {
                log::warn!(
                    "store.database_url is the local default {}; set [store] or {} to publish remotely",
                    config.store.database_url,
                    STORE_URL_ENV
                );
            }
            let store = RestTreeStore::from_config(&config.store)?;
            log::info!("Publishing to {}{}", store.describe(), config.upload.base_path);
            Ok(Box::new(store))
        }
    }
}

/// Publish the configured feed into `store`.
pub async fn run_publish(config: &Config, store: &dyn TreeStore) -> Result<UploadOutcome> {
    console::header("Starting feed upload");

    let feed = load_feed(&config.paths.feed_path()).await?;

    let uploader = ChunkedUploader::new(store, &config.upload);
    let outcome = uploader
        .publish(&feed.document, &config.upload.base_path)
        .await;

    console::summary(
        "Upload",
        &[
            ("Total writes", outcome.total().to_string()),
            ("Successful uploads", outcome.success_count.to_string()),
            ("Failed uploads", outcome.failure_count.to_string()),
        ],
    );

    if !outcome.failures.is_empty() {
        console::separator();
        log::warn!("FAILED UPLOADS:");
        for (index, failure) in outcome.failures.iter().enumerate() {
            log::warn!("{}. {} ({})", index + 1, failure.target_path, failure.description);
            console::sub_item(&format!("Error: {}", failure.error));
        }
    }

    if outcome.success_count > 0 && outcome.is_clean() {
        log::info!(
            "Upload completed successfully! Feed available at {}{}",
            store.describe(),
            config.upload.base_path
        );
    } else {
        log::warn!("Upload completed with some issues. Check the logs above.");
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_run_publish_into_local_tree() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.paths.build_dir = tmp.path().to_path_buf();
        config.upload.chunk_size = 2;
        config.upload.chunk_delay_ms = 0;

        let feed = json!({
            "title": "NES",
            "description": "d",
            "background": "b",
            "thumbnail": "t",
            "longTitle": "NES Arcade",
            "categories": [{
                "title": "A",
                "longTitle": "All",
                "description": "x",
                "items": [{"rom": "1"}, {"rom": "2"}, {"rom": "3"}]
            }]
        });
        tokio::fs::write(config.paths.feed_path(), feed.to_string())
            .await
            .unwrap();

        let tree_file = tmp.path().join("tree.json");
        let store = open_store(&config, Some(tree_file.clone())).await.unwrap();
        let outcome = run_publish(&config, store.as_ref()).await.unwrap();

        assert_eq!(outcome.success_count, 4);
        assert_eq!(outcome.total(), 4);
        assert!(outcome.is_clean());

        let reopened = LocalTreeStore::open(&tree_file).await.unwrap();
        assert_eq!(
            reopened.get("/feed/categories/0/items").await.unwrap(),
            Some(json!({"0": {"rom": "1"}, "1": {"rom": "2"}, "2": {"rom": "3"}}))
        );
    }

    #[tokio::test]
    async fn test_open_store_targets_configured_url() {
        let mut config = Config::default();
        config.store.database_url = "https://feed.example.firebaseio.com/".to_string();
        assert!(!config.store.is_default_url());

        let store = open_store(&config, None).await.unwrap();
        assert_eq!(store.describe(), "https://feed.example.firebaseio.com");
    }

    #[tokio::test]
    async fn test_open_store_rejects_bad_url() {
        let mut config = Config::default();
        config.store.database_url = "not a url".to_string();
        assert!(open_store(&config, None).await.is_err());
    }
}
