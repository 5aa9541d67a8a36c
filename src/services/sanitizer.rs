// src/services/sanitizer.rs

//! Forbidden key rewriting.
//!
//! Renames object keys the tree store rejects (`#`, `*`, ...) by rewriting the
//! serialized text, so untouched bytes stay byte-identical. Only the exact
//! pattern `"<forbidden>":` is rewritten. The result must parse, and must be
//! the original tree with those keys renamed and nothing else changed.

use regex::{NoExpand, Regex};
use serde_json::{Map, Value};

use crate::error::{AppError, Result};
use crate::models::RewriteRule;

/// Matches found for one rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteCount {
    pub rule: RewriteRule,
    pub matches: usize,
}

/// Sanitized text plus per-rule match counts.
#[derive(Debug, Clone)]
pub struct SanitizeOutcome {
    pub text: String,
    pub counts: Vec<RewriteCount>,
}

impl SanitizeOutcome {
    pub fn total_matches(&self) -> usize {
        self.counts.iter().map(|c| c.matches).sum()
    }
}

/// Rewrites forbidden object keys in serialized JSON.
#[derive(Debug, Clone)]
pub struct KeySanitizer {
    rules: Vec<(RewriteRule, Regex)>,
}

impl KeySanitizer {
    /// Compile one key pattern per rule.
    pub fn new(rules: &[RewriteRule]) -> Result<Self> {
        let rules = rules
            .iter()
            .map(|rule| {
                let pattern = format!("\"{}\":", regex::escape(&rule.forbidden));
                Regex::new(&pattern)
                    .map(|re| (rule.clone(), re))
                    .map_err(|e| AppError::config(format!("Bad rewrite rule {:?}: {e}", rule)))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    pub fn rules(&self) -> impl Iterator<Item = &RewriteRule> {
        self.rules.iter().map(|(rule, _)| rule)
    }

    /// Rewrite all forbidden keys in `raw`.
    ///
    /// Fails with `AppError::Validation` when the input or the result does not
    /// parse, or when the result is not a pure key rename of the input.
    pub fn sanitize(&self, raw: &str) -> Result<SanitizeOutcome> {
        let mut text = raw.to_string();
        let mut counts = Vec::with_capacity(self.rules.len());

        for (rule, pattern) in &self.rules {
            let matches = pattern.find_iter(&text).count();
            if matches > 0 {
                let replacement = format!("\"{}\":", rule.replacement);
                text = pattern
                    .replace_all(&text, NoExpand(&replacement))
                    .into_owned();
            }
            counts.push(RewriteCount {
                rule: rule.clone(),
                matches,
            });
        }

        let outcome = SanitizeOutcome { text, counts };
        self.verify(raw, &outcome)?;
        Ok(outcome)
    }

    /// Check that the rewritten text is the original tree with keys renamed.
    fn verify(&self, raw: &str, outcome: &SanitizeOutcome) -> Result<()> {
        let sanitized: Value = serde_json::from_str(&outcome.text).map_err(|e| {
            AppError::validation(format!("sanitized document is not valid JSON: {e}"))
        })?;

        let original: Value = serde_json::from_str(raw).map_err(|e| {
            AppError::validation(format!("source document is not valid JSON: {e}"))
        })?;
        let expected = self.rename_keys(&original, "")?;

        if expected == sanitized {
            return Ok(());
        }
        match self.find_forbidden(&sanitized, "") {
            Some((path, key)) => Err(AppError::validation(format!(
                "forbidden key {key:?} left at '{path}'"
            ))),
            None => Err(AppError::validation(
                "rewrite touched text outside object keys",
            )),
        }
    }

    /// First forbidden key still present in `value`, with its parent path.
    fn find_forbidden(&self, value: &Value, path: &str) -> Option<(String, String)> {
        match value {
            Value::Object(map) => map.iter().find_map(|(key, child)| {
                if self.rules().any(|rule| &rule.forbidden == key) {
                    return Some((format!("{path}/{key}"), key.clone()));
                }
                self.find_forbidden(child, &format!("{path}/{key}"))
            }),
            Value::Array(elements) => elements
                .iter()
                .enumerate()
                .find_map(|(i, child)| self.find_forbidden(child, &format!("{path}/{i}"))),
            _ => None,
        }
    }

    /// Tree-level rename used as the reference result.
    fn rename_keys(&self, value: &Value, path: &str) -> Result<Value> {
        match value {
            Value::Object(map) => {
                let mut renamed = Map::with_capacity(map.len());
                for (key, child) in map {
                    let new_key = self
                        .rules()
                        .find(|rule| &rule.forbidden == key)
                        .map_or(key.as_str(), |rule| rule.replacement.as_str());
                    let child_path = format!("{path}/{key}");
                    let child = self.rename_keys(child, &child_path)?;
                    if renamed.insert(new_key.to_string(), child).is_some() {
                        return Err(AppError::validation(format!(
                            "renaming {key:?} under '{path}' collides with an existing {new_key:?} key"
                        )));
                    }
                }
                Ok(Value::Object(renamed))
            }
            Value::Array(elements) => elements
                .iter()
                .enumerate()
                .map(|(i, child)| self.rename_keys(child, &format!("{path}/{i}")))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            other => Ok(other.clone()),
        }
    }
}
