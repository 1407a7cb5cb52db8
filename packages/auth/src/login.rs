//! # Login controller
//!
//! Ties the pieces of the login screen together:
//!
//! - [`login_with_popup`](LoginController::login_with_popup) counts the attempt,
//!   runs the provider popup through an [`AuthPopup`] and turns its failure into
//!   a transient error (or nothing, if the user just closed the popup).
//! - [`login_with_credentials`](LoginController::login_with_credentials) is the
//!   demo email + password path. It validates the form, waits a simulated round
//!   trip and checks the configured [`DemoAccount`].
//! - [`provider_links`](LoginController::provider_links) computes the
//!   "continue with ..." redirect targets. A provider whose URL cannot be built
//!   gets no link instead of a broken one.
//!
//! Every failure is handled here and ends up as the guard's `last_error`, so
//! the UI only ever has to render a message.

use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::config::AuthConfig;
use crate::form::{validate_login_form, FormErrors};
use crate::guard::{LoginAttemptGuard, LOCKOUT_MESSAGE};
use crate::oauth::OAuthUrlBuilder;
use crate::popup::{AuthPopup, Identity, PopupError};
use crate::provider::Provider;

/// Time the demo credential check pretends to take.
pub const SIMULATED_LATENCY: Duration = Duration::from_millis(1500);

/// Account accepted by the demo email + password path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoAccount {
    pub email: String,
    pub password: String,
}

impl Default for DemoAccount {
    fn default() -> Self {
        Self {
            email: "test@example.com".into(),
            password: "password123".into(),
        }
    }
}

/// Why a login did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginError {
    #[error("Failed to open {} authentication window", .0.display_name())]
    PopupBlocked(Provider),
    #[error("Popup window was closed by the user")]
    PopupClosedByUser,
    #[error("{message}")]
    ProviderAuth { code: String, message: String },
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("{0}")]
    InvalidForm(FormErrors),
    #[error("{}", LOCKOUT_MESSAGE)]
    LockedOut,
}

impl LoginError {
    /// Whether the error is shown to the user as the transient message.
    pub fn is_reportable(&self) -> bool {
        !matches!(self, LoginError::PopupClosedByUser | LoginError::InvalidForm(_))
    }
}

impl From<PopupError> for LoginError {
    fn from(err: PopupError) -> Self {
        match err {
            PopupError::Blocked(provider) => LoginError::PopupBlocked(provider),
            e if e.is_closed_by_user() => LoginError::PopupClosedByUser,
            PopupError::Provider { code, message } => LoginError::ProviderAuth { code, message },
        }
    }
}

/// A "continue with provider" target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderLink {
    pub provider: Provider,
    pub label: String,
    /// `None` when the provider is not configured.
    pub url: Option<Url>,
}

/// Login flow for one screen.
pub struct LoginController<P> {
    config: AuthConfig,
    guard: LoginAttemptGuard,
    popup: P,
    demo_account: DemoAccount,
    latency: Duration,
}

impl<P: AuthPopup> LoginController<P> {
    pub fn new(config: AuthConfig, popup: P) -> Self {
        Self {
            config,
            guard: LoginAttemptGuard::default(),
            popup,
            demo_account: DemoAccount::default(),
            latency: SIMULATED_LATENCY,
        }
    }

    /// Builder method to use a differently configured guard.
    pub fn with_guard(mut self, guard: LoginAttemptGuard) -> Self {
        self.guard = guard;
        self
    }

    /// Builder method to replace the demo account.
    pub fn with_demo_account(mut self, account: DemoAccount) -> Self {
        self.demo_account = account;
        self
    }

    /// Builder method to change the simulated credential check latency.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn guard(&self) -> &LoginAttemptGuard {
        &self.guard
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Authorization URL for `provider`, or `None` (logged) if it cannot be built.
    pub fn authorization_url(&self, provider: &str) -> Option<Url> {
        match OAuthUrlBuilder::new(&self.config).build_for(provider) {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::error!("Error generating {} OAuth URL: {}", provider, e);
                None
            }
        }
    }

    /// Redirect targets for every supported provider.
    pub fn provider_links(&self) -> Vec<ProviderLink> {
        Provider::ALL
            .into_iter()
            .map(|provider| ProviderLink {
                provider,
                label: format!("Continue with {}", provider.display_name()),
                url: self.authorization_url(provider.as_str()),
            })
            .collect()
    }

    /// Sign in through the provider's popup.
    pub async fn login_with_popup(&self, provider: Provider) -> Result<Identity, LoginError> {
        if !self.guard.record_attempt().may_proceed() {
            return Err(self.surface(LoginError::LockedOut));
        }

        match self.popup.open_auth_popup(provider).await {
            Ok(identity) => {
                tracing::info!(%provider, uid = %identity.uid, "Signed in through popup");
                Ok(identity)
            }
            Err(e) => Err(self.surface(e.into())),
        }
    }

    /// Sign in with the demo email + password form.
    ///
    /// Field validation runs first. An invalid form is not an attempt and
    /// leaves the guard untouched, including any error still on display; the
    /// form shows the field messages next to the fields.
    pub async fn login_with_credentials(&self, email: &str, password: &str) -> Result<(), LoginError> {
        validate_login_form(email, password).map_err(LoginError::InvalidForm)?;

        if !self.guard.record_attempt().may_proceed() {
            return Err(self.surface(LoginError::LockedOut));
        }

        tracing::debug!(email, "Login attempt");
        tokio::time::sleep(self.latency).await;

        if email == self.demo_account.email && password == self.demo_account.password {
            tracing::info!(email, "Login successful");
            Ok(())
        } else {
            Err(self.surface(LoginError::InvalidCredentials))
        }
    }

    fn surface(&self, err: LoginError) -> LoginError {
        if !err.is_reportable() {
            tracing::info!("{}", err);
            return err;
        }

        match &err {
            LoginError::ProviderAuth { code, message } => {
                tracing::error!(code, "Provider sign-in failed: {}", message)
            }
            _ => tracing::error!("Login failed: {}", err),
        }
        self.guard.report_failure(err.to_string());
        err
    }
}
