//! Same-origin relay for the vendor inventory feed.
//!
//! The upstream URL embeds the vendor access key, so browsers and tooling
//! fetch the document here instead of from the vendor.

use axum::{
    Json,
    extract::State,
    http::{
        StatusCode,
        header::{CACHE_CONTROL, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::instrument;

use crate::state::AppState;

/// Relay the upstream XML document verbatim.
///
/// GET /api/proxy
#[instrument(skip(state))]
pub async fn relay(State(state): State<AppState>) -> Response {
    match state.feed().document().await {
        Ok(body) => {
            let cache_control = format!(
                "s-maxage={}, stale-while-revalidate",
                state.config().inventory.cache_ttl.as_secs()
            );
            (
                [
                    (CONTENT_TYPE, "application/xml".to_string()),
                    (CACHE_CONTROL, cache_control),
                ],
                body.to_string(),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Proxy error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch XML" })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;
    use crate::store::MemoryRecordStore;
    use crate::test_support::{StaticInventory, test_state};

    #[tokio::test]
    async fn test_upstream_failure_is_json_500() {
        // The test config points the feed at a closed port
        let state = test_state(
            Arc::new(MemoryRecordStore::new()),
            StaticInventory::new("<inventory/>"),
        );
        let response = crate::app(state)
            .oneshot(Request::builder().uri("/api/proxy").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "error": "Failed to fetch XML" }));
    }
}
