//! Session-related types.
//!
//! Flash notifications and the unsent form draft live in the session between
//! a `POST` and the redirected `GET /`.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use classic_matcher_core::NewCustomerRequest;

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
}

impl FlashKind {
    /// CSS modifier used by the template.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// One-shot notification shown on the next page render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }
}

/// Session keys.
pub mod keys {
    /// Pending flash notification.
    pub const FLASH: &str = "flash";

    /// Form values to restore after a failed submission.
    pub const FORM_DRAFT: &str = "form_draft";
}

/// Queue a flash notification for the next render.
///
/// # Errors
///
/// Returns an error if the session store rejects the write.
pub async fn set_flash(session: &Session, flash: Flash) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::FLASH, flash).await
}

/// Remove and return the pending flash notification, if any.
///
/// # Errors
///
/// Returns an error if the session store cannot be read.
pub async fn take_flash(session: &Session) -> Result<Option<Flash>, tower_sessions::session::Error> {
    session.remove::<Flash>(keys::FLASH).await
}

/// Keep the submitted form so the user does not have to retype it.
///
/// # Errors
///
/// Returns an error if the session store rejects the write.
pub async fn set_form_draft(
    session: &Session,
    draft: &NewCustomerRequest,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::FORM_DRAFT, draft).await
}

/// Remove and return the saved form draft, if any.
///
/// # Errors
///
/// Returns an error if the session store cannot be read.
pub async fn take_form_draft(
    session: &Session,
) -> Result<Option<NewCustomerRequest>, tower_sessions::session::Error> {
    session.remove::<NewCustomerRequest>(keys::FORM_DRAFT).await
}
