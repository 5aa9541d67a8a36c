// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::redirect::Policy;

use crate::error::Result;
use crate::models::{CheckerConfig, StoreConfig};

/// Create the client used for URL liveness checks.
///
/// Redirects are not followed: a 3xx answer is itself a live resource.
pub fn create_checker_client(config: &CheckerConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .redirect(Policy::none())
        .build()?;
    Ok(client)
}

/// Create the client used for tree store writes.
pub fn create_store_client(config: &StoreConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("feed-publisher/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}
