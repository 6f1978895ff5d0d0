//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions; added by the binary)
//! 2. `TraceLayer` (request span with method, path and request ID)
//! 3. Request ID (record `x-request-id` on the span, echo it back)
//! 4. Session layer (tower-sessions, in-memory store, flash messages)
//! 5. CSP nonce (generate per-request nonce for inline scripts)
//! 6. Security headers (CSP built from that nonce)

pub mod csp;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use csp::{CspNonce, csp_nonce_middleware};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
