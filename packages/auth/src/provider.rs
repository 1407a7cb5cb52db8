//! Supported OAuth providers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::oauth::BuilderError;

/// An identity provider the login screen can redirect to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Google,
    GitHub,
}

impl Provider {
    /// Every supported provider, in the order the login screen lists them.
    pub const ALL: [Provider; 2] = [Provider::Google, Provider::GitHub];

    /// Lowercase identifier used in paths and environment variable names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::GitHub => "github",
        }
    }

    /// Path on our own origin the provider redirects back to.
    pub fn callback_path(&self) -> &'static str {
        match self {
            Provider::Google => "/auth/google",
            Provider::GitHub => "/auth/github",
        }
    }

    /// Authorization endpoint used when none is configured.
    pub fn default_authorization_endpoint(&self) -> &'static str {
        match self {
            Provider::Google => "https://accounts.google.com/o/oauth2/v2/auth",
            Provider::GitHub => "https://github.com/login/oauth/authorize",
        }
    }

    /// Scope requested when none is configured.
    pub fn default_scope(&self) -> &'static str {
        match self {
            Provider::Google => "openid email profile",
            Provider::GitHub => "user:email",
        }
    }

    /// Human readable name for buttons and log lines.
    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::Google => "Google",
            Provider::GitHub => "GitHub",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = BuilderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "google" => Ok(Provider::Google),
            "github" => Ok(Provider::GitHub),
            other => Err(BuilderError::UnknownProvider(other.to_string())),
        }
    }
}
