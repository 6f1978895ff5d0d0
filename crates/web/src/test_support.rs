//! Shared fixtures for handler tests.

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use secrecy::SecretString;

use crate::config::{InventoryConfig, MatcherConfig, StoreConfig};
use crate::inventory::{InventoryError, InventorySource};
use crate::state::AppState;
use crate::store::SharedStore;

/// Configuration with an in-memory store and an unreachable feed.
pub fn test_config() -> MatcherConfig {
    MatcherConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 3000,
        base_url: "http://localhost:3000".to_string(),
        store: StoreConfig::Memory,
        inventory: InventoryConfig {
            // Discard port: connections are refused immediately
            feed_url: SecretString::from("http://127.0.0.1:9/inventory.xml?access_key=test"),
            cache_ttl: Duration::from_secs(300),
            render_wait: Duration::from_secs(1),
        },
        http_timeout: Duration::from_secs(2),
        log_json: false,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// Inventory source serving a fixed document and counting fetches.
#[derive(Clone)]
pub struct StaticInventory {
    document: Arc<str>,
    fetches: Arc<AtomicUsize>,
}

impl StaticInventory {
    pub fn new(document: &str) -> Self {
        Self {
            document: document.into(),
            fetches: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InventorySource for StaticInventory {
    async fn fetch_document(&self) -> Result<Arc<str>, InventoryError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::clone(&self.document))
    }
}

/// App state over the given store and inventory.
#[allow(clippy::unwrap_used)]
pub fn test_state(store: SharedStore, inventory: StaticInventory) -> AppState {
    AppState::with_inventory_source(test_config(), store, Arc::new(inventory)).unwrap()
}
