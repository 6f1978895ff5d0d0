//! Upstream vendor feed client.

use std::sync::Arc;

use async_trait::async_trait;
use moka::future::Cache;
use secrecy::ExposeSecret;
use tracing::{debug, instrument};
use url::Url;

use super::{InventoryError, InventorySource};
use crate::config::InventoryConfig;

/// Fetches the vendor XML document, caching the body for the configured TTL.
///
/// Cheap to clone; clones share the HTTP client and the cache.
#[derive(Clone)]
pub struct VendorFeed {
    inner: Arc<VendorFeedInner>,
}

struct VendorFeedInner {
    client: reqwest::Client,
    feed_url: Url,
    cache: Cache<(), Arc<str>>,
}

impl VendorFeed {
    /// Create a new feed client.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::InvalidSource`] if the feed URL does not parse,
    /// or [`InventoryError::Http`] if the HTTP client fails to build.
    pub fn new(
        config: &InventoryConfig,
        timeout: std::time::Duration,
    ) -> Result<Self, InventoryError> {
        let feed_url = Url::parse(config.feed_url.expose_secret())
            .map_err(|e| InventoryError::InvalidSource(format!("feed URL: {e}")))?;

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        let cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(VendorFeedInner {
                client,
                feed_url,
                cache,
            }),
        })
    }

    /// Get the document body, from cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream request fails or answers with a
    /// non-success status. Failures are never cached.
    #[instrument(skip(self))]
    pub async fn document(&self) -> Result<Arc<str>, InventoryError> {
        if let Some(body) = self.inner.cache.get(&()).await {
            debug!("Cache hit for inventory feed");
            return Ok(body);
        }

        // The query string carries the vendor key; log the host only.
        debug!(host = ?self.inner.feed_url.host_str(), "Fetching inventory feed");
        let response = self
            .inner
            .client
            .get(self.inner.feed_url.clone())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Inventory feed returned an error");
            return Err(InventoryError::Status(status.as_u16()));
        }

        let body: Arc<str> = response.text().await?.into();
        self.inner.cache.insert((), Arc::clone(&body)).await;
        Ok(body)
    }
}

#[async_trait]
impl InventorySource for VendorFeed {
    async fn fetch_document(&self) -> Result<Arc<str>, InventoryError> {
        self.document().await
    }
}
