//! Storage abstractions for publishing into a hierarchical key-path store.
//!
//! Paths are `/`-delimited; the tree mirrors the feed layout:
//!
//! ```text
//! /feed
//! ├── title, description, background, thumbnail, longTitle
//! └── categories/
//!     ├── 0/
//!     │   ├── title, longTitle, description
//!     │   └── items/
//!     │       ├── 0 ... 49      # chunk 1 (merged)
//!     │       └── 50 ... 99     # chunk 2 (merged)
//!     └── 1/ ...
//! ```

pub mod local;
pub mod rest;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::{AppError, Result};
use crate::models::WriteMode;

// Re-export for convenience
pub use local::LocalTreeStore;
pub use rest::RestTreeStore;

/// Trait for tree store backends.
#[async_trait]
pub trait TreeStore: Send + Sync {
    /// Replace the value at `path`.
    async fn set(&self, path: &str, value: &Value) -> Result<()>;

    /// Replace only the children of `path` named in `children`; siblings stay.
    async fn update(&self, path: &str, children: &Map<String, Value>) -> Result<()>;

    /// Read the value at `path`, `None` when nothing is stored there.
    async fn get(&self, path: &str) -> Result<Option<Value>>;

    /// Human-readable location for log lines.
    fn describe(&self) -> String;

    /// Apply a write in the given mode.
    async fn write(&self, path: &str, value: &Value, mode: WriteMode) -> Result<()> {
        match mode {
            WriteMode::Set => self.set(path, value).await,
            WriteMode::Merge => match value {
                Value::Object(children) => self.update(path, children).await,
                _ => Err(AppError::store(path, "merge payload must be an object")),
            },
        }
    }
}

/// Split a store path into its non-empty segments.
pub fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Read the node at `segments`. Array nodes are addressed by index.
pub fn get_at<'a>(root: &'a Value, segments: &[&str]) -> Option<&'a Value> {
    let mut node = root;
    for segment in segments {
        node = match node {
            Value::Object(map) => map.get(*segment)?,
            Value::Array(elements) => elements.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    match node {
        Value::Null => None,
        other => Some(other),
    }
}

/// Replace the node at `segments`, creating intermediate objects.
///
/// Writing `null` removes the node. Arrays on the way are turned into
/// index-keyed objects so children can be addressed by key.
pub fn set_at(root: &mut Value, segments: &[&str], value: Value) {
    let Some((last, parents)) = segments.split_last() else {
        *root = value;
        return;
    };

    let mut node = root;
    for segment in parents {
        let map = as_object_mut(node);
        node = map
            .entry((*segment).to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    let map = as_object_mut(node);
    if value.is_null() {
        map.remove(*last);
    } else {
        map.insert((*last).to_string(), value);
    }
}

/// Merge `children` into the node at `segments`.
pub fn update_at(root: &mut Value, segments: &[&str], children: &Map<String, Value>) {
    for (key, child) in children {
        let mut path = segments.to_vec();
        path.push(key.as_str());
        set_at(root, &path, child.clone());
    }
}

fn as_object_mut(node: &mut Value) -> &mut Map<String, Value> {
    if let Value::Array(elements) = node {
        let converted: Map<String, Value> = std::mem::take(elements)
            .into_iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v))
            .collect();
        *node = Value::Object(converted);
    }
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => map,
        _ => unreachable!("node was just replaced with an object"),
    }
}
