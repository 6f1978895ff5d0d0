//! Record store clients for customer requests.
//!
//! # Backends
//!
//! - [`RestRecordStore`] - Hosted backend REST API (`/rest/v1/{table}`)
//! - [`PgRecordStore`] - Direct `PostgreSQL` connection to the same table
//! - [`MemoryRecordStore`] - Process-local, for development and tests
//!
//! The backend is the single source of truth. Callers never patch a local
//! copy after a mutation; they call [`RecordStore::list`] again.

mod memory;
mod postgres;
mod rest;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use classic_matcher_core::{CustomerRequest, NewCustomerRequest, RequestId};

use crate::config::StoreConfig;
use crate::db;

pub use memory::{MemoryRecordStore, StoreOp};
pub use postgres::PgRecordStore;
pub use rest::RestRecordStore;

/// Errors that can occur when talking to the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend rejected the request (constraint violation, auth, ...).
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// No row with this ID exists.
    #[error("Customer request not found: {0}")]
    NotFound(RequestId),

    /// The backend answered with something unexpected.
    #[error("Unexpected response: {0}")]
    Unexpected(String),
}

/// Create, read and delete operations on the `customer_requests` table.
///
/// No transactions beyond single rows and no retries: a failed call is
/// terminal for the action that issued it.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All requests, newest first.
    async fn list(&self) -> Result<Vec<CustomerRequest>, StoreError>;

    /// Insert one validated request and return the stored row.
    async fn insert(&self, request: &NewCustomerRequest) -> Result<CustomerRequest, StoreError>;

    /// Delete a request by ID.
    ///
    /// Deleting an ID that does not exist returns [`StoreError::NotFound`].
    async fn delete(&self, id: &RequestId) -> Result<(), StoreError>;

    /// Cheap reachability check for readiness probes.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Shared, dynamically dispatched record store.
pub type SharedStore = Arc<dyn RecordStore>;

/// Construct the configured backend.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built or the database pool
/// cannot connect.
pub async fn connect(config: &StoreConfig, timeout: Duration) -> Result<SharedStore, StoreError> {
    let store: SharedStore = match config {
        StoreConfig::Rest(rest) => Arc::new(RestRecordStore::new(rest, timeout)?),
        StoreConfig::Postgres { database_url } => {
            let pool = db::create_pool(database_url).await?;
            Arc::new(PgRecordStore::new(pool))
        }
        StoreConfig::Memory => Arc::new(MemoryRecordStore::new()),
    };
    tracing::info!(backend = config.kind(), "Record store ready");
    Ok(store)
}
