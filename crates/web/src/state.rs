//! Application state shared across handlers.

use std::sync::{Arc, PoisonError, RwLock};

use classic_matcher_core::CustomerRequest;

use crate::config::MatcherConfig;
use crate::inventory::{InventoryError, InventoryService, InventorySource, VendorFeed};
use crate::store::SharedStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// record store, the vendor feed and configuration. It also remembers the
/// last record list the store returned, so a failed read can still show it.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: MatcherConfig,
    store: SharedStore,
    feed: VendorFeed,
    inventory: InventoryService,
    last_records: RwLock<Arc<Vec<CustomerRequest>>>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The relay endpoint and in-process matching share one [`VendorFeed`],
    /// and with it one upstream cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the inventory feed URL is invalid or the HTTP
    /// client cannot be built.
    pub fn new(config: MatcherConfig, store: SharedStore) -> Result<Self, InventoryError> {
        let feed = VendorFeed::new(&config.inventory, config.http_timeout)?;
        let inventory =
            InventoryService::with_render_wait(Arc::new(feed.clone()), config.inventory.render_wait);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                feed,
                inventory,
                last_records: RwLock::default(),
            }),
        })
    }

    /// Create state whose matching reads inventory from `source` instead of
    /// the vendor feed. The relay endpoint still serves the vendor feed.
    ///
    /// # Errors
    ///
    /// Returns an error if the inventory feed URL is invalid or the HTTP
    /// client cannot be built.
    pub fn with_inventory_source(
        config: MatcherConfig,
        store: SharedStore,
        source: Arc<dyn InventorySource>,
    ) -> Result<Self, InventoryError> {
        let feed = VendorFeed::new(&config.inventory, config.http_timeout)?;
        let inventory = InventoryService::with_render_wait(source, config.inventory.render_wait);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                feed,
                inventory,
                last_records: RwLock::default(),
            }),
        })
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &MatcherConfig {
        &self.inner.config
    }

    /// Get the record store.
    #[must_use]
    pub fn store(&self) -> &SharedStore {
        &self.inner.store
    }

    /// Get the cached upstream feed client.
    #[must_use]
    pub fn feed(&self) -> &VendorFeed {
        &self.inner.feed
    }

    /// Get the inventory service used for matching.
    #[must_use]
    pub fn inventory(&self) -> &InventoryService {
        &self.inner.inventory
    }

    /// Remember a freshly listed set of records and return it shared.
    pub fn remember_records(&self, records: Vec<CustomerRequest>) -> Arc<Vec<CustomerRequest>> {
        let records = Arc::new(records);
        *self
            .inner
            .last_records
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::clone(&records);
        records
    }

    /// The last record list the store returned (empty before the first).
    #[must_use]
    pub fn last_records(&self) -> Arc<Vec<CustomerRequest>> {
        Arc::clone(
            &self
                .inner
                .last_records
                .read()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }
}
