// src/services/extractor.rs

//! Resource URL extraction from the feed tree.

use serde_json::Value;

use crate::models::UrlRecord;
use crate::utils::json::{JsonVisitor, walk};

/// Field name carrying an item's resource URL.
pub const ROM_FIELD: &str = "rom";

/// Collect every string value stored under a `rom` field, in document order.
pub fn extract_urls(document: &Value) -> Vec<UrlRecord> {
    extract_field(document, ROM_FIELD)
}

/// Collect every string value stored under `field`, at any depth.
pub fn extract_field(document: &Value, field: &str) -> Vec<UrlRecord> {
    let mut collector = FieldCollector {
        field,
        records: Vec::new(),
    };
    walk(document, &mut collector);
    collector.records
}

struct FieldCollector<'a> {
    field: &'a str,
    records: Vec<UrlRecord>,
}

impl JsonVisitor for FieldCollector<'_> {
    fn visit_field(&mut self, path: &str, key: &str, value: &Value) -> bool {
        match value {
            Value::String(url) if key == self.field => {
                self.records.push(UrlRecord::new(url.clone(), path));
                false
            }
            _ => true,
        }
    }
}
