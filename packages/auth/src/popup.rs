//! Identity-provider popup port.
//!
//! The popup SDK opens a separate window, lets the user sign in there and
//! hands the result back. Everything about the window itself lives behind
//! [`AuthPopup`]; this crate only looks at the outcome.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::provider::Provider;

/// Error code the identity provider reports when the user closes the popup.
pub const POPUP_CLOSED_BY_USER: &str = "auth/popup-closed-by-user";

/// The signed-in user as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

/// Ways the popup round trip can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PopupError {
    /// The browser refused to open the window.
    #[error("Failed to open {} authentication window", .0.display_name())]
    Blocked(Provider),
    /// The provider rejected the sign-in with a coded error.
    #[error("{message}")]
    Provider { code: String, message: String },
}

impl PopupError {
    pub fn provider(code: impl Into<String>, message: impl Into<String>) -> Self {
        PopupError::Provider {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Whether this is the user dismissing the popup rather than a failure.
    pub fn is_closed_by_user(&self) -> bool {
        matches!(self, PopupError::Provider { code, .. } if code == POPUP_CLOSED_BY_USER)
    }
}

/// Opens the provider's sign-in popup and waits for its result.
pub trait AuthPopup {
    fn open_auth_popup(
        &self,
        provider: Provider,
    ) -> impl std::future::Future<Output = Result<Identity, PopupError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_by_user_is_recognised() {
        assert!(PopupError::provider(POPUP_CLOSED_BY_USER, "closed").is_closed_by_user());
        assert!(!PopupError::provider("auth/network-request-failed", "offline").is_closed_by_user());
        assert!(!PopupError::Blocked(Provider::Google).is_closed_by_user());
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            PopupError::Blocked(Provider::Google).to_string(),
            "Failed to open Google authentication window"
        );
        assert_eq!(
            PopupError::provider("auth/internal-error", "Something broke").to_string(),
            "Something broke"
        );
    }
}
