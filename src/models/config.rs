//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Input, backup and report file locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// URL liveness checking behavior
    #[serde(default)]
    pub checker: CheckerConfig,

    /// Chunked publishing behavior
    #[serde(default)]
    pub upload: UploadConfig,

    /// Remote tree store connection
    #[serde(default)]
    pub store: StoreConfig,

    /// Forbidden key rewrite rules
    #[serde(default)]
    pub sanitize: SanitizeConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.checker.user_agent.trim().is_empty() {
            return Err(AppError::validation("checker.user_agent is empty"));
        }
        if self.checker.timeout_secs == 0 {
            return Err(AppError::validation("checker.timeout_secs must be > 0"));
        }
        if self.checker.max_concurrent == 0 {
            return Err(AppError::validation("checker.max_concurrent must be > 0"));
        }
        if self.upload.chunk_size == 0 {
            return Err(AppError::validation("upload.chunk_size must be > 0"));
        }
        if self.store.timeout_secs == 0 {
            return Err(AppError::validation("store.timeout_secs must be > 0"));
        }
        if !self.upload.base_path.starts_with('/') {
            return Err(AppError::validation("upload.base_path must start with '/'"));
        }
        if self.sanitize.rules.is_empty() {
            return Err(AppError::validation("No sanitize rules defined"));
        }
        for rule in &self.sanitize.rules {
            if rule.forbidden.is_empty() || rule.replacement.is_empty() {
                return Err(AppError::validation(format!(
                    "Sanitize rule {:?} -> {:?} has an empty side",
                    rule.forbidden, rule.replacement
                )));
            }
            if self
                .sanitize
                .rules
                .iter()
                .any(|other| other.forbidden == rule.replacement)
            {
                return Err(AppError::validation(format!(
                    "Replacement {:?} collides with a forbidden key",
                    rule.replacement
                )));
            }
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            checker: CheckerConfig::default(),
            upload: UploadConfig::default(),
            store: StoreConfig::default(),
            sanitize: SanitizeConfig::default(),
        }
    }
}

/// File locations, relative to `build_dir` unless absolute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "defaults::build_dir")]
    pub build_dir: PathBuf,

    #[serde(default = "defaults::feed_file")]
    pub feed_file: String,

    #[serde(default = "defaults::backup_file")]
    pub backup_file: String,

    #[serde(default = "defaults::invalid_urls_file")]
    pub invalid_urls_file: String,

    #[serde(default = "defaults::report_file")]
    pub report_file: String,
}

impl PathsConfig {
    pub fn feed_path(&self) -> PathBuf {
        self.build_dir.join(&self.feed_file)
    }

    pub fn backup_path(&self) -> PathBuf {
        self.build_dir.join(&self.backup_file)
    }

    pub fn invalid_urls_path(&self) -> PathBuf {
        self.build_dir.join(&self.invalid_urls_file)
    }

    pub fn report_path(&self) -> PathBuf {
        self.build_dir.join(&self.report_file)
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            build_dir: defaults::build_dir(),
            feed_file: defaults::feed_file(),
            backup_file: defaults::backup_file(),
            invalid_urls_file: defaults::invalid_urls_file(),
            report_file: defaults::report_file(),
        }
    }
}

/// URL liveness checking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Batch size; URLs in one batch are checked concurrently
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Cooldown between batches in milliseconds
    #[serde(default = "defaults::batch_delay")]
    pub batch_delay_ms: u64,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_concurrent: defaults::max_concurrent(),
            batch_delay_ms: defaults::batch_delay(),
        }
    }
}

/// Chunked publishing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Store path the feed is published under
    #[serde(default = "defaults::base_path")]
    pub base_path: String,

    /// Items per chunk write
    #[serde(default = "defaults::chunk_size")]
    pub chunk_size: usize,

    /// Pause after each chunk write in milliseconds
    #[serde(default = "defaults::chunk_delay")]
    pub chunk_delay_ms: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            base_path: defaults::base_path(),
            chunk_size: defaults::chunk_size(),
            chunk_delay_ms: defaults::chunk_delay(),
        }
    }
}

/// Remote tree store connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Root URL of the store's REST endpoint
    #[serde(default = "defaults::database_url")]
    pub database_url: String,

    /// Optional auth token appended as `?auth=`
    #[serde(default)]
    pub auth_token: Option<String>,

    /// Client-wide request timeout in seconds
    #[serde(default = "defaults::store_timeout")]
    pub timeout_secs: u64,
}

impl StoreConfig {
    /// Whether `database_url` is still the local emulator default.
    pub fn is_default_url(&self) -> bool {
        self.database_url.trim_end_matches('/') == defaults::database_url()
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: defaults::database_url(),
            auth_token: None,
            timeout_secs: defaults::store_timeout(),
        }
    }
}

/// Forbidden key rewrite settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SanitizeConfig {
    #[serde(default = "defaults::rewrite_rules")]
    pub rules: Vec<RewriteRule>,
}

impl Default for SanitizeConfig {
    fn default() -> Self {
        Self {
            rules: defaults::rewrite_rules(),
        }
    }
}

/// A forbidden object key and the store-safe key that replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteRule {
    pub forbidden: String,
    pub replacement: String,
}

impl RewriteRule {
    pub fn new(forbidden: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            forbidden: forbidden.into(),
            replacement: replacement.into(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    use super::RewriteRule;

    // Path defaults
    pub fn build_dir() -> PathBuf {
        PathBuf::from("build")
    }
    pub fn feed_file() -> String {
        "feed.json".into()
    }
    pub fn backup_file() -> String {
        "feed.json.backup".into()
    }
    pub fn invalid_urls_file() -> String {
        "invalid-rom-urls.json".into()
    }
    pub fn report_file() -> String {
        "rom-validation-report.json".into()
    }

    // Checker defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; ROM-Validator/1.0)".into()
    }
    pub fn timeout() -> u64 {
        10
    }
    pub fn max_concurrent() -> usize {
        5
    }
    pub fn batch_delay() -> u64 {
        1000
    }

    // Upload defaults
    pub fn base_path() -> String {
        "/feed".into()
    }
    pub fn chunk_size() -> usize {
        50
    }
    pub fn chunk_delay() -> u64 {
        100
    }

    // Store defaults
    pub fn database_url() -> String {
        "http://127.0.0.1:9000".into()
    }
    pub fn store_timeout() -> u64 {
        30
    }

    // Sanitize defaults
    pub fn rewrite_rules() -> Vec<RewriteRule> {
        vec![RewriteRule::new("#", "z_hash"), RewriteRule::new("*", "z_star")]
    }
}
