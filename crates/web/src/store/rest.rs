//! Hosted backend REST client.
//!
//! Speaks the PostgREST dialect exposed at `{project_url}/rest/v1/{table}`.
//! The anon key goes in both `apikey` and `Authorization: Bearer`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use tracing::instrument;
use url::Url;

use classic_matcher_core::{CustomerRequest, NewCustomerRequest, RequestId};

use super::{RecordStore, StoreError};
use crate::config::RestStoreConfig;

/// Ask the backend to echo affected rows back.
const RETURN_REPRESENTATION: &str = "return=representation";

/// Client for the hosted backend's table API.
#[derive(Clone)]
pub struct RestRecordStore {
    client: reqwest::Client,
    table_url: Url,
}

impl RestRecordStore {
    /// Create a new REST record store client.
    ///
    /// # Errors
    ///
    /// Returns error if the URL or key is malformed or the HTTP client fails to build.
    pub fn new(config: &RestStoreConfig, timeout: Duration) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();

        let key = config.anon_key.expose_secret();
        let mut api_key = HeaderValue::from_str(key)
            .map_err(|e| StoreError::Unexpected(format!("Invalid API key format: {e}")))?;
        api_key.set_sensitive(true);
        headers.insert("apikey", api_key);

        let mut bearer = HeaderValue::from_str(&format!("Bearer {key}"))
            .map_err(|e| StoreError::Unexpected(format!("Invalid API key format: {e}")))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            table_url: table_url(&config.url, &config.table)?,
        })
    }

    fn list_url(&self) -> Url {
        let mut url = self.table_url.clone();
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("order", "created_at.desc");
        url
    }

    fn delete_url(&self, id: &RequestId) -> Url {
        let mut url = self.table_url.clone();
        url.query_pairs_mut()
            .append_pair("id", &format!("eq.{id}"));
        url
    }

    /// Turn a non-success response into [`StoreError::Api`].
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        tracing::warn!(
            status = %status,
            body = %message.chars().take(500).collect::<String>(),
            "Record store returned non-success status"
        );
        Err(StoreError::Api {
            status: status.as_u16(),
            message: api_message(&message),
        })
    }
}

#[async_trait]
impl RecordStore for RestRecordStore {
    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<CustomerRequest>, StoreError> {
        let response = self.client.get(self.list_url()).send().await?;
        let rows: Vec<CustomerRequest> = Self::check(response).await?.json().await?;
        tracing::debug!(count = rows.len(), "Fetched customer requests");
        Ok(rows)
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    async fn insert(&self, request: &NewCustomerRequest) -> Result<CustomerRequest, StoreError> {
        let response = self
            .client
            .post(self.table_url.clone())
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&[request])
            .send()
            .await?;

        let rows: Vec<CustomerRequest> = Self::check(response).await?.json().await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::Unexpected("insert returned no rows".to_string()))
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn delete(&self, id: &RequestId) -> Result<(), StoreError> {
        let response = self
            .client
            .delete(self.delete_url(id))
            .header("Prefer", RETURN_REPRESENTATION)
            .send()
            .await?;

        // The filter matching nothing is not an error for the backend.
        let rows: Vec<serde_json::Value> = Self::check(response).await?.json().await?;
        if rows.is_empty() {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut url = self.table_url.clone();
        url.query_pairs_mut()
            .append_pair("select", "id")
            .append_pair("limit", "1");
        let response = self.client.get(url).send().await?;
        Self::check(response).await.map(|_| ())
    }
}

/// Build `{base}/rest/v1/{table}`.
fn table_url(base: &str, table: &str) -> Result<Url, StoreError> {
    let url = format!("{}/rest/v1/{table}", base.trim_end_matches('/'));
    Url::parse(&url).map_err(|e| StoreError::Unexpected(format!("Invalid backend URL: {e}")))
}

/// Pull the human-readable message out of a backend error body.
fn api_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_else(|| body.chars().take(200).collect())
}
