//! Vendor inventory feed: fetching, relaying and parsing.
//!
//! # Architecture
//!
//! - [`VendorFeed`] fetches the upstream XML (URL carries the vendor access
//!   key) and caches the body in `moka` for a short TTL. The `/api/proxy`
//!   relay serves from it, and in-process matching reads through it, so both
//!   share one cache.
//! - [`RelayClient`] fetches the same document through a running server's
//!   `/api/proxy`. The CLI uses it so the vendor key never leaves the server.
//! - [`InventoryService`] parses whatever source it is given and keeps the
//!   last good result. Page renders wait only a bounded time for a refresh
//!   running in the background, so a slow or failing feed degrades matching
//!   to stale data instead of holding the page.

mod feed;
mod parse;
mod relay;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::watch;
use tracing::instrument;

use classic_matcher_core::InventoryItem;

pub use feed::VendorFeed;
pub use parse::parse_inventory;
pub use relay::{RELAY_PATH, RelayClient};

/// Errors that can occur while fetching or parsing the inventory feed.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status.
    #[error("Upstream returned status {0}")]
    Status(u16),

    /// The document is not well-formed XML.
    #[error("XML parse error: {0}")]
    Parse(String),

    /// The source could not be configured.
    #[error("Invalid inventory source: {0}")]
    InvalidSource(String),
}

impl From<quick_xml::Error> for InventoryError {
    fn from(err: quick_xml::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Something that can produce the raw inventory XML document.
#[async_trait]
pub trait InventorySource: Send + Sync {
    /// Fetch the document body.
    async fn fetch_document(&self) -> Result<Arc<str>, InventoryError>;
}

/// Default bound on how long [`InventoryService::current`] waits.
pub const DEFAULT_RENDER_WAIT: Duration = Duration::from_secs(1);

/// Inventory fetcher that never fails its caller.
///
/// Fetch or parse failures are logged and the previous (possibly empty)
/// inventory is returned instead. At most one refresh runs at a time.
///
/// Cheap to clone; clones share the source and the last-known list.
#[derive(Clone)]
pub struct InventoryService {
    inner: Arc<InventoryServiceInner>,
}

struct InventoryServiceInner {
    source: Arc<dyn InventorySource>,
    last_known: RwLock<Arc<Vec<InventoryItem>>>,
    render_wait: Duration,
    refreshing: AtomicBool,
    /// Bumped each time a background refresh finishes, successful or not.
    refreshed: watch::Sender<u64>,
}

impl InventoryService {
    /// Create a service over the given source with an empty last-known list.
    #[must_use]
    pub fn new(source: Arc<dyn InventorySource>) -> Self {
        Self::with_render_wait(source, DEFAULT_RENDER_WAIT)
    }

    /// Create a service whose [`current`](Self::current) waits at most
    /// `render_wait` for a fresh inventory.
    #[must_use]
    pub fn with_render_wait(source: Arc<dyn InventorySource>, render_wait: Duration) -> Self {
        let (refreshed, _) = watch::channel(0);
        Self {
            inner: Arc::new(InventoryServiceInner {
                source,
                last_known: RwLock::new(Arc::new(Vec::new())),
                render_wait,
                refreshing: AtomicBool::new(false),
                refreshed,
            }),
        }
    }

    /// Fetch and parse the current inventory, remembering it on success.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be fetched or parsed. The
    /// last-known inventory is left untouched in that case.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<Arc<Vec<InventoryItem>>, InventoryError> {
        let document = self.inner.source.fetch_document().await?;
        let items = Arc::new(parse_inventory(&document)?);
        tracing::debug!(count = items.len(), "Parsed inventory feed");

        *self
            .inner
            .last_known
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::clone(&items);
        Ok(items)
    }

    /// Inventory for a page render.
    ///
    /// Starts a background refresh (unless one is already running) and
    /// waits for it up to the render wait. If the refresh fails or is still
    /// running after that, the last known inventory is returned.
    pub async fn current(&self) -> Arc<Vec<InventoryItem>> {
        let mut refreshed = self.inner.refreshed.subscribe();
        self.spawn_refresh();

        if tokio::time::timeout(self.inner.render_wait, refreshed.changed())
            .await
            .is_err()
        {
            tracing::debug!(
                wait_ms = self.inner.render_wait.as_millis(),
                "Inventory refresh still running, using last known inventory"
            );
        }
        self.last_known()
    }

    /// The most recent successfully parsed inventory.
    #[must_use]
    pub fn last_known(&self) -> Arc<Vec<InventoryItem>> {
        Arc::clone(
            &self
                .inner
                .last_known
                .read()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }

    fn spawn_refresh(&self) {
        if self.inner.refreshing.swap(true, Ordering::AcqRel) {
            return;
        }

        let service = self.clone();
        tokio::spawn(async move {
            if let Err(e) = service.refresh().await {
                tracing::warn!(error = %e, "Inventory fetch failed, using last known inventory");
            }
            service.inner.refreshing.store(false, Ordering::Release);
            service.inner.refreshed.send_modify(|generation| *generation += 1);
        });
    }
}
