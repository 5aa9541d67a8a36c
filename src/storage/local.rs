//! Local tree store implementation.
//!
//! Holds the whole tree in memory and, when backed by a file, rewrites that
//! file atomically after every write. Used for dry runs and testing.
//! Production deployments should use `RestTreeStore`.
//!
//! ## Write Semantics
//!
//! - `set`: replaces the subtree at the path (`null` deletes it)
//! - `update`: replaces each named child, keeping the others

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::storage::{TreeStore, get_at, segments, set_at, update_at};
use crate::utils::fs::write_atomic;

/// Local tree store backend.
pub struct LocalTreeStore {
    file: Option<PathBuf>,
    tree: Mutex<Value>,
}

impl LocalTreeStore {
    /// Create a store that lives only in memory.
    pub fn in_memory() -> Self {
        Self {
            file: None,
            tree: Mutex::new(Value::Null),
        }
    }

    /// Open a file-backed store, loading the existing tree if present.
    pub async fn open(file: impl Into<PathBuf>) -> Result<Self> {
        let file = file.into();
        let tree = match tokio::fs::read(&file).await {
            Ok(bytes) if bytes.is_empty() => Value::Null,
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Value::Null,
            Err(e) => return Err(AppError::Io(e)),
        };

        Ok(Self {
            file: Some(file),
            tree: Mutex::new(tree),
        })
    }

    /// Clone of the whole tree.
    pub async fn snapshot(&self) -> Value {
        self.tree.lock().await.clone()
    }

    async fn persist(&self, tree: &Value) -> Result<()> {
        if let Some(file) = &self.file {
            let bytes = serde_json::to_vec_pretty(tree)?;
            write_atomic(file, &bytes).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl TreeStore for LocalTreeStore {
    async fn set(&self, path: &str, value: &Value) -> Result<()> {
        let mut tree = self.tree.lock().await;
        set_at(&mut tree, &segments(path), value.clone());
        self.persist(&tree).await
    }

    async fn update(&self, path: &str, children: &Map<String, Value>) -> Result<()> {
        let mut tree = self.tree.lock().await;
        update_at(&mut tree, &segments(path), children);
        self.persist(&tree).await
    }

    async fn get(&self, path: &str) -> Result<Option<Value>> {
        let tree = self.tree.lock().await;
        Ok(get_at(&tree, &segments(path)).cloned())
    }

    fn describe(&self) -> String {
        match &self.file {
            Some(file) => format!("local file {}", file.display()),
            None => "in-memory tree".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_set_and_get() {
        let store = LocalTreeStore::in_memory();
        store.set("/feed", &json!({"title": "NES"})).await.unwrap();

        assert_eq!(store.get("/feed/title").await.unwrap(), Some(json!("NES")));
        assert_eq!(store.get("/feed/missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_persists_and_reopens() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("tree.json");

        let store = LocalTreeStore::open(&file).await.unwrap();
        store.set("/feed/categories/0", &json!({"title": "A"})).await.unwrap();
        let chunk = json!({"0": {"rom": "a"}});
        store
            .update("/feed/categories/0/items", chunk.as_object().unwrap())
            .await
            .unwrap();

        let reopened = LocalTreeStore::open(&file).await.unwrap();
        assert_eq!(
            reopened.get("/feed/categories/0/items/0/rom").await.unwrap(),
            Some(json!("a"))
        );
        assert_eq!(
            reopened.get("/feed/categories/0/title").await.unwrap(),
            Some(json!("A"))
        );
    }

    #[tokio::test]
    async fn test_open_missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let store = LocalTreeStore::open(tmp.path().join("nope.json")).await.unwrap();
        assert_eq!(store.snapshot().await, Value::Null);
    }
}
