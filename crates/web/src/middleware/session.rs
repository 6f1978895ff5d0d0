//! Session middleware configuration.
//!
//! Sessions only carry flash notifications and a failed form's draft, so an
//! in-memory store is enough; losing them on restart loses nothing durable.

use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::MatcherConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "ccm_session";

/// Session expiry time in seconds (1 hour of inactivity).
const SESSION_EXPIRY_SECONDS: i64 = 60 * 60;

/// Create the session layer with an in-memory store.
#[must_use]
pub fn create_session_layer(config: &MatcherConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
