//! Relay endpoint and relay client tests against a stub vendor feed.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::StatusCode;
use serde_json::json;

use classic_matcher_core::{InventoryItem, NewCustomerRequest};
use classic_matcher_integration_tests::{FEED_XML, HTTP_TIMEOUT, RENDER_WAIT, TestContext};
use classic_matcher_web::inventory::{InventoryService, RelayClient};
use classic_matcher_web::store::RecordStore;

#[tokio::test]
async fn test_relay_serves_upstream_verbatim_and_caches() {
    let ctx = TestContext::new().await;

    let response = ctx
        .client
        .get(ctx.url("/api/proxy"))
        .send()
        .await
        .expect("relay request");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").expect("header"),
        "application/xml"
    );
    assert_eq!(
        response.headers().get("cache-control").expect("header"),
        "s-maxage=300, stale-while-revalidate"
    );
    assert_eq!(response.text().await.expect("body"), FEED_XML);

    let again = ctx
        .client
        .get(ctx.url("/api/proxy"))
        .send()
        .await
        .expect("relay request");
    assert_eq!(again.status(), StatusCode::OK);
    assert_eq!(ctx.feed.hits(), 1);
}

#[tokio::test]
async fn test_relay_upstream_failure_is_json_500() {
    let ctx = TestContext::with_feed_path("/broken.xml").await;

    let response = ctx
        .client
        .get(ctx.url("/api/proxy"))
        .send()
        .await
        .expect("relay request");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json().await.expect("json body");
    assert_eq!(body, json!({ "error": "Failed to fetch XML" }));
}

#[tokio::test]
async fn test_matching_survives_upstream_failure() {
    let ctx = TestContext::with_feed_path("/broken.xml").await;

    let page = ctx.add_request("Jane", "", "1967 Ford Mustang Fastback").await;
    assert!(page.contains("Customer added"));
    assert!(page.contains("No matches found."));
}

#[tokio::test]
async fn test_stalled_feed_does_not_hold_the_page() {
    let ctx = TestContext::with_feed_path("/stalled.xml").await;
    ctx.store
        .insert(&NewCustomerRequest {
            name: "Jane".to_string(),
            vehicle_request: "1967 Ford Mustang Fastback".to_string(),
            ..Default::default()
        })
        .await
        .expect("seed insert");

    for _ in 0..2 {
        let started = Instant::now();
        let page = ctx.list_page("").await;
        let elapsed = started.elapsed();

        assert!(page.contains("Jane"));
        assert!(page.contains("No matches found."));
        assert!(elapsed < RENDER_WAIT * 3, "render took {elapsed:?}");
        assert!(elapsed < HTTP_TIMEOUT);
    }
    // The second render joined the refresh already waiting on the feed
    assert_eq!(ctx.feed.hits(), 1);
}

#[tokio::test]
async fn test_relay_client_reads_inventory_through_server() {
    let ctx = TestContext::new().await;

    let relay = RelayClient::new(&ctx.base_url, Duration::from_secs(5)).expect("relay client");
    let service = InventoryService::new(Arc::new(relay));
    let items = service.refresh().await.expect("inventory");

    assert_eq!(
        items.as_slice(),
        &[
            InventoryItem::new("1967", "Ford", "Mustang Fastback"),
            InventoryItem::new("1963", "Chevrolet", "Corvette"),
        ]
    );
}
