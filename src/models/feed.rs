//! Projections over the untyped feed document.

use serde::Serialize;
use serde_json::{Map, Value};

/// Root fields published as the feed's metadata record.
pub const FEED_METADATA_FIELDS: [&str; 5] =
    ["title", "description", "background", "thumbnail", "longTitle"];

/// Category fields published ahead of its items.
pub const CATEGORY_METADATA_FIELDS: [&str; 3] = ["title", "longTitle", "description"];

/// Copy the named fields out of an object, skipping absent ones.
pub fn project(value: &Value, fields: &[&str]) -> Map<String, Value> {
    let mut out = Map::new();
    if let Some(object) = value.as_object() {
        for field in fields {
            if let Some(v) = object.get(*field) {
                out.insert((*field).to_string(), v.clone());
            }
        }
    }
    out
}

/// The `categories` array, if the document has one.
pub fn categories(document: &Value) -> Option<&Vec<Value>> {
    document.get("categories").and_then(Value::as_array)
}

/// The `items` array of a category, empty when missing.
pub fn items(category: &Value) -> &[Value] {
    category
        .get("items")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Display title of a category for log lines.
pub fn category_title(category: &Value, index: usize) -> String {
    category
        .get("title")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("#{index}"))
}

/// Size summary of a loaded feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeedStats {
    pub size_bytes: usize,
    pub category_count: usize,
    pub item_count: usize,
}

impl FeedStats {
    pub fn collect(document: &Value, size_bytes: usize) -> Self {
        let cats = categories(document).map(Vec::as_slice).unwrap_or(&[]);
        Self {
            size_bytes,
            category_count: cats.len(),
            item_count: cats.iter().map(|c| items(c).len()).sum(),
        }
    }

    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / 1024.0 / 1024.0
    }
}
