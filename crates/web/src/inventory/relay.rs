//! Client for a running server's `/api/proxy` relay.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::instrument;
use url::Url;

use super::{InventoryError, InventorySource};

/// Path of the relay endpoint, relative to the server's base URL.
pub const RELAY_PATH: &str = "/api/proxy";

/// Fetches the inventory document through the relay.
///
/// Used by tooling that should not hold the vendor access key.
#[derive(Debug, Clone)]
pub struct RelayClient {
    client: reqwest::Client,
    endpoint: Url,
}

impl RelayClient {
    /// Create a client for the server at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL does not parse or the HTTP client
    /// fails to build.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, InventoryError> {
        let endpoint = Url::parse(base_url)
            .and_then(|base| base.join(RELAY_PATH))
            .map_err(|e| InventoryError::InvalidSource(format!("base URL {base_url}: {e}")))?;

        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    /// The full relay URL.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl InventorySource for RelayClient {
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn fetch_document(&self) -> Result<Arc<str>, InventoryError> {
        let response = self.client.get(self.endpoint.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(InventoryError::Status(status.as_u16()));
        }
        Ok(response.text().await?.into())
    }
}
