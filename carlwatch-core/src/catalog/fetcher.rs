//! Remote catalog retrieval

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info};

use super::{feed, Catalog};
use crate::config::HttpSettings;
use crate::error::FetchError;
use crate::retry::RetryPolicy;

/// Where the current catalog comes from
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch and normalize the current catalog
    async fn fetch(&self) -> Result<Catalog, FetchError>;

    /// Human-readable origin for logging
    fn describe(&self) -> String;
}

/// Carlcare feed over HTTP
pub struct HttpCatalogSource {
    client: reqwest::Client,
    url: String,
    retry: RetryPolicy,
}

impl HttpCatalogSource {
    pub fn new(url: impl Into<String>, http: &HttpSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("carlwatch/", env!("CARGO_PKG_VERSION")))
            .timeout(http.timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            url: url.into(),
            retry: http.retry,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn fetch_once(&self) -> Result<Catalog, FetchError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: self.url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: self.url.clone(),
                status,
            });
        }

        let body = response.text().await.map_err(|source| FetchError::Body {
            url: self.url.clone(),
            source,
        })?;
        debug!("Received {} bytes from {}", body.len(), self.url);

        feed::parse_feed(&body).map_err(|source| FetchError::Decode {
            url: self.url.clone(),
            source,
        })
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch(&self) -> Result<Catalog, FetchError> {
        info!("Fetching catalog from {}", self.url);

        let catalog = self
            .retry
            .run("Catalog fetch", || self.fetch_once(), FetchError::is_transient)
            .await?;

        info!(
            "Fetched {} brands ({} models)",
            catalog.len(),
            catalog.model_count()
        );
        Ok(catalog)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
