//! REST tree store implementation.
//!
//! Talks to a Firebase-Realtime-Database-compatible endpoint:
//! - `set`    → `PUT    {database_url}{path}.json`
//! - `update` → `PATCH  {database_url}{path}.json` (merge by child key)
//! - `get`    → `GET    {database_url}{path}.json`

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde_json::{Map, Value};

use crate::error::{AppError, Result};
use crate::models::StoreConfig;
use crate::storage::{TreeStore, segments};
use crate::utils::http::create_store_client;

/// REST-based tree store.
#[derive(Clone)]
pub struct RestTreeStore {
    client: Client,
    database_url: String,
    auth_token: Option<String>,
}

impl RestTreeStore {
    /// Create a new REST store instance.
    pub fn new(
        client: Client,
        database_url: impl Into<String>,
        auth_token: Option<String>,
    ) -> Self {
        Self {
            client,
            database_url: database_url.into().trim_end_matches('/').to_string(),
            auth_token,
        }
    }

    /// Create a REST store from configuration.
    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        url::Url::parse(&config.database_url)?;
        let client = create_store_client(config)?;
        Ok(Self::new(
            client,
            config.database_url.clone(),
            config.auth_token.clone(),
        ))
    }

    /// Endpoint URL for a store path.
    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}.json", self.database_url, segments(path).join("/"))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.endpoint(path));
        match &self.auth_token {
            Some(token) => builder.query(&[("auth", token)]),
            None => builder,
        }
    }

    async fn send(&self, path: &str, builder: RequestBuilder) -> Result<reqwest::Response> {
        let response = builder.send().await.map_err(AppError::network)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = if body.trim().is_empty() {
            format!("HTTP {}", status.as_u16())
        } else {
            format!("HTTP {}: {}", status.as_u16(), body.trim())
        };
        Err(AppError::store(path, detail))
    }
}

#[async_trait]
impl TreeStore for RestTreeStore {
    async fn set(&self, path: &str, value: &Value) -> Result<()> {
        let builder = self.request(Method::PUT, path).json(value);
        self.send(path, builder).await?;
        log::debug!("PUT {} ok", path);
        Ok(())
    }

    async fn update(&self, path: &str, children: &Map<String, Value>) -> Result<()> {
        let builder = self.request(Method::PATCH, path).json(children);
        self.send(path, builder).await?;
        log::debug!("PATCH {} ({} children) ok", path, children.len());
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Option<Value>> {
        let response = self.send(path, self.request(Method::GET, path)).await?;
        let value: Value = response.json().await?;
        Ok(if value.is_null() { None } else { Some(value) })
    }

    fn describe(&self) -> String {
        self.database_url.clone()
    }
}
