//! Feed loaders.

use std::time::Duration;

use bytes::Bytes;
use reqwest::header::ACCEPT;
use reqwest::Client;

use crate::config::MapConfig;
use crate::error::{FetchError, HazardMapError};

/// Source of raw feed responses.
#[async_trait::async_trait]
pub trait FeedLoader: Send + Sync {
    /// Loads the body behind `url` in a single attempt.
    async fn load(&self, url: &str) -> Result<Bytes, FetchError>;
}

/// Loads feeds over HTTP.
#[derive(Debug, Clone)]
pub struct WebFeedLoader {
    client: Client,
}

impl WebFeedLoader {
    /// Creates a loader that identifies itself with `user_agent`.
    ///
    /// Without `timeout` a request waits as long as the connection stays open.
    pub fn new(user_agent: &str, timeout: Option<Duration>) -> Result<Self, HazardMapError> {
        let mut builder = Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|err| HazardMapError::Client(err.to_string()))?;
        Ok(Self { client })
    }

    /// Creates a loader from the session config.
    pub fn from_config(config: &MapConfig) -> Result<Self, HazardMapError> {
        Self::new(&config.user_agent, config.request_timeout())
    }
}

#[async_trait::async_trait]
impl FeedLoader for WebFeedLoader {
    async fn load(&self, url: &str) -> Result<Bytes, FetchError> {
        log::info!("⬇ Downloading feed: {url}");

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/geo+json, application/json")
            .send()
            .await
            .inspect_err(|err| log::error!("✗ Network error loading feed {url}: {err}"))?;

        let response = response
            .error_for_status()
            .inspect_err(|err| log::warn!("✗ Feed {url} answered with {:?}", err.status()))?;

        let bytes = response.bytes().await?;
        log::info!("✓ Downloaded {} bytes from: {url}", bytes.len());

        Ok(bytes)
    }
}
