//! # Auth crate — the logic behind the sign-in screen
//!
//! The screen offers three ways in: a popup sign-in through an identity
//! provider, redirect links to Google and GitHub, and a demo email + password
//! form. Rendering is left to the caller; this crate decides what the links
//! point to and what message (if any) the screen shows.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | Per-provider client ids, scopes and endpoints, read once from the environment |
//! | [`provider`] | The supported providers and their fixed properties |
//! | [`oauth`] | Authorization URL construction (`client_id` checks, fixed parameter sets) |
//! | [`guard`] | Attempt counting, CAPTCHA lockout and the auto-clearing error message |
//! | [`popup`] | Port for the provider's popup sign-in |
//! | [`form`] | Email + password field validation |
//! | [`login`] | The controller wiring all of the above to user actions |

pub mod config;
pub mod form;
pub mod guard;
pub mod login;
pub mod oauth;
pub mod popup;
pub mod provider;

pub use config::{AuthConfig, ConfigError, ProviderConfig};
pub use form::{validate_email_live, validate_login_form, FormErrors};
pub use guard::{
    AttemptOutcome, GuardEvent, GuardSettings, GuardState, LastError, LockoutMode,
    LoginAttemptGuard, LoginAttemptState,
};
pub use login::{DemoAccount, LoginController, LoginError, ProviderLink};
pub use oauth::{build_authorization_url, BuilderError, OAuthUrlBuilder};
pub use popup::{AuthPopup, Identity, PopupError, POPUP_CLOSED_BY_USER};
pub use provider::Provider;
