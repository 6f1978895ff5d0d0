//! Integration tests for Classic Car Matcher.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p classic-matcher-integration-tests
//! ```
//!
//! Every test boots its own server on `127.0.0.1:0` with an in-memory
//! record store, plus a stub vendor feed on another ephemeral port. No
//! external services are needed.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use reqwest::Client;
use secrecy::SecretString;

use classic_matcher_web::config::{InventoryConfig, MatcherConfig, StoreConfig};
use classic_matcher_web::state::AppState;
use classic_matcher_web::store::MemoryRecordStore;

/// Inventory document served by the stub feed.
pub const FEED_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<inventory>
  <vehicle>
    <stock>A101</stock>
    <year>1967</year>
    <make>Ford</make>
    <model>Mustang Fastback</model>
  </vehicle>
  <vehicle>
    <stock>A102</stock>
    <year>1963</year>
    <make>Chevrolet</make>
    <model>Corvette</model>
  </vehicle>
</inventory>"#;

/// How long a page render waits for the feed in these tests.
pub const RENDER_WAIT: Duration = Duration::from_secs(1);

/// Outbound timeout used by the app under test.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Stub vendor feed that counts requests.
#[derive(Clone)]
pub struct StubFeed {
    pub addr: SocketAddr,
    hits: Arc<AtomicUsize>,
}

impl StubFeed {
    /// Serve [`FEED_XML`] at `/feed.xml`, a 500 at `/broken.xml`, and a
    /// response that never arrives in time at `/stalled.xml`.
    pub async fn start() -> Self {
        let hits = Arc::new(AtomicUsize::new(0));

        let app = Router::new()
            .route("/feed.xml", get(serve_feed))
            .route("/broken.xml", get(serve_broken))
            .route("/stalled.xml", get(serve_stalled))
            .with_state(Arc::clone(&hits));

        let addr = serve(app).await;
        Self { addr, hits }
    }

    /// Number of upstream requests received so far.
    #[must_use]
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// URL of a path on the stub, with a vendor-style access key.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}?access_key=test-key", self.addr)
    }
}

async fn serve_feed(State(hits): State<Arc<AtomicUsize>>) -> &'static str {
    hits.fetch_add(1, Ordering::SeqCst);
    FEED_XML
}

async fn serve_broken(State(hits): State<Arc<AtomicUsize>>) -> StatusCode {
    hits.fetch_add(1, Ordering::SeqCst);
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn serve_stalled(State(hits): State<Arc<AtomicUsize>>) -> &'static str {
    hits.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_secs(60)).await;
    FEED_XML
}

/// Bind an ephemeral port and serve `app` in the background.
///
/// # Panics
///
/// Panics if the port cannot be bound.
pub async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Listener has no address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    addr
}

/// A running web app plus its collaborators.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
    pub store: MemoryRecordStore,
    pub feed: StubFeed,
}

impl TestContext {
    /// Start the app with the stub feed's working document.
    pub async fn new() -> Self {
        Self::with_feed_path("/feed.xml").await
    }

    /// Start the app with the feed URL pointing at `path` on the stub.
    ///
    /// # Panics
    ///
    /// Panics if the app state or HTTP client cannot be built.
    pub async fn with_feed_path(path: &str) -> Self {
        let feed = StubFeed::start().await;
        let store = MemoryRecordStore::new();

        let config = MatcherConfig {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            base_url: "http://127.0.0.1".to_string(),
            store: StoreConfig::Memory,
            inventory: InventoryConfig {
                feed_url: SecretString::from(feed.url(path)),
                cache_ttl: Duration::from_secs(300),
                render_wait: RENDER_WAIT,
            },
            http_timeout: HTTP_TIMEOUT,
            log_json: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };

        let state = AppState::new(config, Arc::new(store.clone()))
            .expect("Failed to build app state");
        let addr = serve(classic_matcher_web::app(state)).await;

        let client = Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: format!("http://{addr}"),
            store,
            feed,
        }
    }

    /// Absolute URL for a path on the app.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Submit the request form; follows the redirect and returns the page.
    ///
    /// # Panics
    ///
    /// Panics if the request fails or the body cannot be read.
    pub async fn add_request(&self, name: &str, email: &str, vehicle: &str) -> String {
        self.client
            .post(self.url("/requests"))
            .form(&[
                ("name", name),
                ("email", email),
                ("phone", ""),
                ("vehicle_request", vehicle),
            ])
            .send()
            .await
            .expect("Failed to submit request form")
            .text()
            .await
            .expect("Failed to read list page")
    }

    /// Fetch the list page with the given query string.
    ///
    /// # Panics
    ///
    /// Panics if the request fails or the body cannot be read.
    pub async fn list_page(&self, query: &str) -> String {
        self.client
            .get(self.url(&format!("/{query}")))
            .send()
            .await
            .expect("Failed to load list page")
            .text()
            .await
            .expect("Failed to read list page")
    }
}

/// The part of the page between two element IDs.
///
/// # Panics
///
/// Panics if `start` does not occur in `page`.
#[must_use]
pub fn section<'a>(page: &'a str, start: &str, end: Option<&str>) -> &'a str {
    let marker = format!("id=\"{start}\"");
    let (_, rest) = page
        .split_once(marker.as_str())
        .unwrap_or_else(|| panic!("section {start} not found"));
    match end {
        Some(end) => rest
            .split_once(format!("id=\"{end}\"").as_str())
            .map_or(rest, |(head, _)| head),
        None => rest,
    }
}
