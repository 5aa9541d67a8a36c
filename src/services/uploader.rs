// src/services/uploader.rs

//! Chunked feed publishing.
//!
//! Splits the feed into bounded writes and issues them one at a time:
//!
//! 1. feed metadata → `{base}`
//! 2. per category: metadata → `{base}/categories/{i}`, then item chunks
//!    merged into `{base}/categories/{i}/items`, keyed by absolute index
//!
//! A failed write is counted and the run continues with the next unit.

use std::time::Duration;

use serde_json::{Map, Value};

use crate::models::feed::{self, CATEGORY_METADATA_FIELDS, FEED_METADATA_FIELDS};
use crate::models::{UnitKind, UploadConfig, UploadOutcome, UploadUnit, WriteMode};
use crate::storage::TreeStore;
use crate::utils::join_store_path;

/// Service for publishing a feed document into a tree store.
pub struct ChunkedUploader<'a> {
    store: &'a dyn TreeStore,
    chunk_size: usize,
    chunk_delay: Duration,
}

impl<'a> ChunkedUploader<'a> {
    /// Create an uploader with chunking taken from configuration.
    pub fn new(store: &'a dyn TreeStore, config: &UploadConfig) -> Self {
        Self::with_chunking(
            store,
            config.chunk_size,
            Duration::from_millis(config.chunk_delay_ms),
        )
    }

    /// Create an uploader with explicit chunk size and inter-chunk delay.
    pub fn with_chunking(store: &'a dyn TreeStore, chunk_size: usize, chunk_delay: Duration) -> Self {
        Self {
            store,
            chunk_size: chunk_size.max(1),
            chunk_delay,
        }
    }

    /// Decompose `document` into the ordered list of writes.
    pub fn plan(document: &Value, base_path: &str, chunk_size: usize) -> Vec<UploadUnit> {
        let base = join_store_path(base_path, &[]);

        let Some(categories) = feed::categories(document) else {
            return vec![UploadUnit {
                target_path: base,
                kind: UnitKind::WholeDocument,
                mode: WriteMode::Set,
                payload: document.clone(),
            }];
        };

        let chunk_size = chunk_size.max(1);
        let mut units = vec![UploadUnit {
            target_path: base.clone(),
            kind: UnitKind::RootMetadata,
            mode: WriteMode::Set,
            payload: Value::Object(feed::project(document, &FEED_METADATA_FIELDS)),
        }];

        for (category, entry) in categories.iter().enumerate() {
            let category_path = join_store_path(&base, &["categories", &category.to_string()]);
            units.push(UploadUnit {
                target_path: category_path.clone(),
                kind: UnitKind::CategoryMetadata { category },
                mode: WriteMode::Set,
                payload: Value::Object(feed::project(entry, &CATEGORY_METADATA_FIELDS)),
            });

            let items_path = join_store_path(&category_path, &["items"]);
            for (chunk, items) in feed::items(entry).chunks(chunk_size).enumerate() {
                let start = chunk * chunk_size;
                let payload: Map<String, Value> = items
                    .iter()
                    .enumerate()
                    .map(|(offset, item)| ((start + offset).to_string(), item.clone()))
                    .collect();

                units.push(UploadUnit {
                    target_path: items_path.clone(),
                    kind: UnitKind::ItemChunk {
                        category,
                        chunk,
                        start,
                        len: items.len(),
                    },
                    mode: WriteMode::Merge,
                    payload: Value::Object(payload),
                });
            }
        }

        units
    }

    /// Publish `document` under `base_path`, tallying every write.
    pub async fn publish(&self, document: &Value, base_path: &str) -> UploadOutcome {
        log::info!(
            "Uploading to {} in chunks of {} items...",
            self.store.describe(),
            self.chunk_size
        );

        let units = Self::plan(document, base_path, self.chunk_size);
        let mut outcome = UploadOutcome::default();

        let categories = feed::categories(document).map(Vec::as_slice).unwrap_or(&[]);

        for unit in &units {
            if let UnitKind::CategoryMetadata { category } = unit.kind {
                let title = categories
                    .get(category)
                    .map(|entry| feed::category_title(entry, category))
                    .unwrap_or_default();
                log::info!(
                    "Uploading category {}/{}: {}",
                    category + 1,
                    categories.len(),
                    title
                );
            }

            outcome = self.write_unit(unit, outcome).await;

            if matches!(unit.kind, UnitKind::ItemChunk { .. }) && !self.chunk_delay.is_zero() {
                tokio::time::sleep(self.chunk_delay).await;
            }
        }

        outcome
    }

    /// Issue one write and fold its result into `outcome`.
    async fn write_unit(&self, unit: &UploadUnit, outcome: UploadOutcome) -> UploadOutcome {
        let result = self
            .store
            .write(&unit.target_path, &unit.payload, unit.mode)
            .await;

        match &result {
            Ok(()) => log::info!("✓ Uploaded {} to {}", unit.kind, unit.target_path),
            Err(e) => log::error!(
                "✗ Failed to upload {} to {}: {}",
                unit.kind,
                unit.target_path,
                e
            ),
        }

        outcome.record(unit, result.map_err(|e| e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, Result};
    use crate::storage::LocalTreeStore;
    use async_trait::async_trait;
    use serde_json::json;

    fn feed(sizes: &[usize]) -> Value {
        let categories: Vec<Value> = sizes
            .iter()
            .enumerate()
            .map(|(c, &n)| {
                json!({
                    "title": format!("Cat {c}"),
                    "longTitle": format!("Category {c}"),
                    "description": "games",
                    "items": (0..n)
                        .map(|i| json!({"name": format!("game {c}-{i}"), "rom": format!("https://x/{c}/{i}.nes")}))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        json!({
            "title": "NES",
            "description": "feed",
            "background": "bg.png",
            "thumbnail": "thumb.png",
            "longTitle": "NES Arcade",
            "categories": categories
        })
    }

    /// Store that rejects every write under a path prefix.
    struct FailingStore {
        inner: LocalTreeStore,
        fail_prefix: String,
    }

    #[async_trait]
    impl TreeStore for FailingStore {
        async fn set(&self, path: &str, value: &Value) -> Result<()> {
            if path.starts_with(&self.fail_prefix) {
                return Err(AppError::store(path, "HTTP 503"));
            }
            self.inner.set(path, value).await
        }

        async fn update(&self, path: &str, children: &Map<String, Value>) -> Result<()> {
            if path.starts_with(&self.fail_prefix) {
                return Err(AppError::store(path, "HTTP 503"));
            }
            self.inner.update(path, children).await
        }

        async fn get(&self, path: &str) -> Result<Option<Value>> {
            self.inner.get(path).await
        }

        fn describe(&self) -> String {
            "failing store".to_string()
        }
    }

    #[test]
    fn test_plan_unit_counts() {
        let units = ChunkedUploader::plan(&feed(&[120, 30]), "/feed", 50);

        assert_eq!(units.len(), 7);
        assert_eq!(units[0].kind, UnitKind::RootMetadata);
        assert_eq!(units[1].kind, UnitKind::CategoryMetadata { category: 0 });
        assert_eq!(
            units[4].kind,
            UnitKind::ItemChunk {
                category: 0,
                chunk: 2,
                start: 100,
                len: 20
            }
        );
        assert_eq!(units[5].target_path, "/feed/categories/1");
        assert_eq!(units[6].target_path, "/feed/categories/1/items");
        assert_eq!(units[6].mode, WriteMode::Merge);
    }

    #[test]
    fn test_plan_root_metadata_projection() {
        let units = ChunkedUploader::plan(&feed(&[1]), "/feed", 50);
        assert_eq!(
            units[0].payload,
            json!({
                "title": "NES",
                "description": "feed",
                "background": "bg.png",
                "thumbnail": "thumb.png",
                "longTitle": "NES Arcade"
            })
        );
        assert_eq!(
            units[1].payload,
            json!({"title": "Cat 0", "longTitle": "Category 0", "description": "games"})
        );
    }

    #[test]
    fn test_plan_chunk_keys_are_absolute() {
        let units = ChunkedUploader::plan(&feed(&[7]), "/feed", 3);
        let keys: Vec<&String> = units[4].payload.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["6"]);
        let keys: Vec<&String> = units[3].payload.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["3", "4", "5"]);
    }

    #[test]
    fn test_plan_without_categories() {
        let doc = json!({"title": "flat", "items": [1, 2, 3]});
        let units = ChunkedUploader::plan(&doc, "/feed", 50);

        assert_eq!(units.len(), 1);
        assert_eq!(units[0].kind, UnitKind::WholeDocument);
        assert_eq!(units[0].target_path, "/feed");
        assert_eq!(units[0].payload, doc);
    }

    #[test]
    fn test_plan_empty_categories() {
        let doc = json!({"title": "empty", "categories": []});
        let units = ChunkedUploader::plan(&doc, "/feed", 50);
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].kind, UnitKind::RootMetadata);
    }

    #[tokio::test]
    async fn test_publish_reconstructs_items() {
        let store = LocalTreeStore::in_memory();
        let doc = feed(&[120, 30]);
        let uploader = ChunkedUploader::with_chunking(&store, 50, Duration::ZERO);

        let outcome = uploader.publish(&doc, "/feed").await;

        assert_eq!(outcome.success_count, 7);
        assert_eq!(outcome.failure_count, 0);

        let items = store.get("/feed/categories/0/items").await.unwrap().unwrap();
        let items = items.as_object().unwrap();
        assert_eq!(items.len(), 120);
        for (index, item) in doc["categories"][0]["items"].as_array().unwrap().iter().enumerate() {
            assert_eq!(&items[&index.to_string()], item);
        }
        assert_eq!(
            store.get("/feed/categories/1/title").await.unwrap(),
            Some(json!("Cat 1"))
        );
        assert_eq!(store.get("/feed/title").await.unwrap(), Some(json!("NES")));
    }

    #[tokio::test]
    async fn test_publish_continues_after_failures() {
        let store = FailingStore {
            inner: LocalTreeStore::in_memory(),
            fail_prefix: "/feed/categories/0".to_string(),
        };
        let uploader = ChunkedUploader::with_chunking(&store, 50, Duration::ZERO);

        let outcome = uploader.publish(&feed(&[120, 30]), "/feed").await;

        // category 0: metadata + 3 chunks fail; root + category 1 succeed
        assert_eq!(outcome.failure_count, 4);
        assert_eq!(outcome.success_count, 3);
        assert_eq!(outcome.failures[0].target_path, "/feed/categories/0");
        assert!(outcome.failures[0].error.contains("HTTP 503"));
        assert!(
            store
                .get("/feed/categories/1/items/29")
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_publish_pauses_after_each_item_chunk() {
        let store = LocalTreeStore::in_memory();
        let uploader = ChunkedUploader::with_chunking(&store, 2, Duration::from_millis(150));

        let started = std::time::Instant::now();
        let outcome = uploader.publish(&feed(&[5]), "/feed").await;
        let elapsed = started.elapsed();

        assert_eq!(outcome.success_count, 5);
        // three chunks, one pause each
        assert!(elapsed >= Duration::from_millis(450), "{elapsed:?}");
    }

    #[tokio::test]
    async fn test_publish_metadata_writes_do_not_pause() {
        let store = LocalTreeStore::in_memory();
        let uploader = ChunkedUploader::with_chunking(&store, 2, Duration::from_millis(500));

        let started = std::time::Instant::now();
        let outcome = uploader.publish(&feed(&[0, 0, 0]), "/feed").await;

        assert_eq!(outcome.success_count, 4);
        assert!(started.elapsed() < Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_publish_whole_document() {
        let store = LocalTreeStore::in_memory();
        let doc = json!({"title": "flat"});
        let uploader = ChunkedUploader::with_chunking(&store, 50, Duration::ZERO);

        let outcome = uploader.publish(&doc, "/feed").await;

        assert_eq!(outcome.success_count, 1);
        assert_eq!(store.get("/feed").await.unwrap(), Some(doc));
    }
}
