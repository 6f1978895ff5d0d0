//! End-to-end tests for the request list: create, filter, match, delete.

use reqwest::StatusCode;

use classic_matcher_core::NewCustomerRequest;
use classic_matcher_integration_tests::{TestContext, section};
use classic_matcher_web::store::{RecordStore, StoreOp};

#[tokio::test]
async fn test_empty_list_skips_inventory_fetch() {
    let ctx = TestContext::new().await;

    let page = ctx.list_page("").await;
    assert!(page.contains("No customer requests found."));
    assert!(page.contains("No matches found."));
    assert_eq!(ctx.feed.hits(), 0);
}

#[tokio::test]
async fn test_added_request_is_listed_and_matched() {
    let ctx = TestContext::new().await;

    let page = ctx
        .add_request("Jane Doe", "jane@example.com", "1967 Ford Mustang Fastback")
        .await;
    assert!(page.contains("Customer added"));

    let list = section(&page, "requests", Some("matches"));
    assert!(list.contains("Jane Doe"));
    assert!(list.contains("1967 Ford Mustang Fastback"));

    let matches = section(&page, "matches", None);
    assert!(matches.contains("Jane Doe"));
    assert!(!matches.contains("No matches found."));
}

#[tokio::test]
async fn test_only_exact_year_and_full_model_match() {
    let ctx = TestContext::new().await;

    ctx.add_request("Jane", "", "1967 ford MUSTANG FASTBACK").await;
    ctx.add_request("Bob", "", "1968 Ford Mustang Fastback").await;
    ctx.add_request("Carl", "", "1967 Ford Mustang").await;
    ctx.add_request("Dana", "", "Mustang").await;
    let page = ctx.list_page("").await;

    let matches = section(&page, "matches", None);
    assert!(matches.contains("Jane"));
    assert!(!matches.contains("Bob"));
    assert!(!matches.contains("Carl"));
    assert!(!matches.contains("Dana"));

    // Every record is still listed
    let list = section(&page, "requests", Some("matches"));
    for name in ["Jane", "Bob", "Carl", "Dana"] {
        assert!(list.contains(name), "{name} missing from list");
    }
}

#[tokio::test]
async fn test_filters_and_sort_apply_to_list() {
    let ctx = TestContext::new().await;

    ctx.add_request("Zoe", "", "1969 Chevrolet Camaro").await;
    ctx.add_request("Amy", "", "1967 Ford Mustang").await;
    ctx.add_request("Bea", "", "1970 Ford Bronco").await;

    let page = ctx.list_page("?make=Ford&sort=model").await;
    let list = section(&page, "requests", Some("matches"));
    assert!(!list.contains("Zoe"));
    let bea = list.find("Bea").expect("Bea listed");
    let amy = list.find("Amy").expect("Amy listed");
    assert!(bea < amy, "Bronco sorts before Mustang");

    let page = ctx.list_page("?search=ZO").await;
    let list = section(&page, "requests", Some("matches"));
    assert!(list.contains("Zoe"));
    assert!(!list.contains("Amy"));
}

#[tokio::test]
async fn test_invalid_submission_never_reaches_store() {
    let ctx = TestContext::new().await;

    let page = ctx.add_request("", "", "1967 Ford Mustang").await;
    assert!(page.contains("Failed to add customer"));
    assert!(ctx.store.operations().iter().all(|op| !matches!(op, StoreOp::Insert { .. })));
    assert!(ctx.store.is_empty());
}

#[tokio::test]
async fn test_delete_flow() {
    let ctx = TestContext::new().await;
    let created = ctx
        .store
        .insert(&NewCustomerRequest {
            name: "Jane".to_string(),
            vehicle_request: "1967 Ford Mustang".to_string(),
            ..NewCustomerRequest::default()
        })
        .await
        .expect("seed insert");

    let response = ctx
        .client
        .post(ctx.url(&format!("/requests/{}/delete", created.id)))
        .send()
        .await
        .expect("delete request");
    assert_eq!(response.status(), StatusCode::OK);
    let page = response.text().await.expect("page body");
    assert!(page.contains("Deleted successfully"));
    assert!(page.contains("No customer requests found."));

    // Second delete of the same ID is a failure notice, not a crash
    let page = ctx
        .client
        .post(ctx.url(&format!("/requests/{}/delete", created.id)))
        .send()
        .await
        .expect("delete request")
        .text()
        .await
        .expect("page body");
    assert!(page.contains("Failed to delete"));
}

#[tokio::test]
async fn test_security_headers_carry_script_nonce() {
    let ctx = TestContext::new().await;

    let response = ctx.client.get(ctx.url("/")).send().await.expect("list page");
    let csp = response
        .headers()
        .get("content-security-policy")
        .and_then(|v| v.to_str().ok())
        .expect("CSP header")
        .to_string();
    assert!(response.headers().contains_key("x-request-id"));
    let page = response.text().await.expect("page body");

    let nonce = csp
        .split("'nonce-")
        .nth(1)
        .and_then(|rest| rest.split('\'').next())
        .expect("nonce in CSP");
    assert!(page.contains(&format!("<script nonce=\"{nonce}\">")));
}

#[tokio::test]
async fn test_unknown_path_is_404() {
    let ctx = TestContext::new().await;
    let response = ctx
        .client
        .get(ctx.url("/nowhere"))
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
