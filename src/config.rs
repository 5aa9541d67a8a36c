// src/config.rs

//! Configuration loading utilities.
//!
//! This module loads the TOML configuration and applies the environment
//! overrides used by deployments that keep store credentials out of files.

use std::path::Path;

use crate::models::Config;

/// Environment variable overriding `store.database_url`.
pub const STORE_URL_ENV: &str = "FEED_STORE_URL";

/// Environment variable overriding `store.auth_token`.
pub const STORE_AUTH_ENV: &str = "FEED_STORE_AUTH";

/// Load configuration from a TOML file, falling back to defaults,
/// then apply environment overrides.
pub fn load_config(path: &Path) -> Config {
    let mut config = Config::load_or_default(path);
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config
}

/// Apply store overrides from an environment lookup.
pub fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(url) = lookup(STORE_URL_ENV).filter(|v| !v.trim().is_empty()) {
        log::debug!("Using store URL from {}", STORE_URL_ENV);
        config.store.database_url = url;
    }
    if let Some(token) = lookup(STORE_AUTH_ENV).filter(|v| !v.trim().is_empty()) {
        log::debug!("Using store auth token from {}", STORE_AUTH_ENV);
        config.store.auth_token = Some(token);
    }
}
