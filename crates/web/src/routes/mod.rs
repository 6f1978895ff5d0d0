//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Request list: form, filters, list, matches
//! POST /requests                - Create request (form-encoded, redirects to /)
//! POST /requests/{id}/delete    - Delete request (redirects to /)
//!
//! # Inventory
//! GET  /api/proxy               - Vendor XML relay (cached)
//!
//! # Probes
//! GET  /health                  - Liveness
//! GET  /health/ready            - Readiness (record store reachable)
//! ```
//!
//! Mutating routes accept the list's filter parameters in their query
//! string and redirect back with them intact.

pub mod health;
pub mod proxy;
pub mod requests;

use axum::{
    Router,
    http::Uri,
    routing::{get, post},
};

use crate::error::AppError;
use crate::state::AppState;

/// Create all application routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(requests::index))
        .route("/requests", post(requests::create))
        .route("/requests/{id}/delete", post(requests::delete))
        .route("/api/proxy", get(proxy::relay))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
}

/// Fallback for unknown paths.
pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}
