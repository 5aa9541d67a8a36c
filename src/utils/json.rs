// src/utils/json.rs

//! Generic depth-first traversal over `serde_json::Value` trees.

use serde_json::Value;

/// Receives every object field encountered during a walk.
pub trait JsonVisitor {
    /// Visit a field at `path`. Return `true` to descend into its value.
    fn visit_field(&mut self, path: &str, key: &str, value: &Value) -> bool;
}

/// Walk `value` depth-first in document order.
pub fn walk<V: JsonVisitor>(value: &Value, visitor: &mut V) {
    walk_at(value, "", visitor);
}

fn walk_at<V: JsonVisitor>(value: &Value, path: &str, visitor: &mut V) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let child_path = field_path(path, key);
                if visitor.visit_field(&child_path, key, child) {
                    walk_at(child, &child_path, visitor);
                }
            }
        }
        Value::Array(elements) => {
            for (index, child) in elements.iter().enumerate() {
                walk_at(child, &index_path(path, index), visitor);
            }
        }
        _ => {}
    }
}

/// `parent.key`, or `key` at the root.
pub fn field_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

/// `parent[index]`.
pub fn index_path(parent: &str, index: usize) -> String {
    format!("{parent}[{index}]")
}
