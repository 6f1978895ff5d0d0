//! Liveness and readiness probes.

use axum::extract::State;

use crate::error::Result;
use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies the record store is reachable. The inventory feed is not
/// checked; matching degrades without it.
pub async fn readiness(State(state): State<AppState>) -> Result<&'static str> {
    state.store().ping().await?;
    Ok("ok")
}
