//! OAuth configuration from environment variables.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `GOOGLE_CLIENT_ID` / `GITHUB_CLIENT_ID` | unset (URL construction fails with `MissingClientId`) |
//! | `GOOGLE_SCOPE` / `GITHUB_SCOPE` | `openid email profile` / `user:email` |
//! | `GOOGLE_AUTH_URL` / `GITHUB_AUTH_URL` | the provider's public authorization endpoint |
//! | `APP_ORIGIN` | `http://localhost:8080` |
//!
//! The configuration is read once at start-up and passed around by reference;
//! nothing in this crate looks at the environment after that.

use oauth2::{AuthUrl, ClientId};
use thiserror::Error;

use crate::provider::Provider;

/// Origin used when `APP_ORIGIN` is not set.
pub const DEFAULT_ORIGIN: &str = "http://localhost:8080";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is not a valid URL: {source}")]
    InvalidUrl {
        var: String,
        #[source]
        source: url::ParseError,
    },
    #[error("{var} must not contain a query or fragment: {url}")]
    EndpointHasQuery { var: String, url: String },
}

/// Per-provider OAuth configuration.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// `None` when the client id is unset or empty.
    pub client_id: Option<ClientId>,
    pub authorization_endpoint: AuthUrl,
    pub scope: String,
}

impl ProviderConfig {
    /// Configuration with the provider's default endpoint and scope.
    pub fn new(provider: Provider, client_id: Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            client_id: non_empty(client_id).map(ClientId::new),
            authorization_endpoint: parse_auth_url(
                "default endpoint",
                provider.default_authorization_endpoint().to_string(),
            )?,
            scope: provider.default_scope().to_string(),
        })
    }

    /// Builder method to override the requested scope.
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Builder method to override the authorization endpoint.
    pub fn with_endpoint(mut self, endpoint: AuthUrl) -> Self {
        self.authorization_endpoint = endpoint;
        self
    }

    fn from_lookup<F>(provider: Provider, lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let prefix = provider.as_str().to_uppercase();
        let mut config = Self::new(provider, lookup(format!("{prefix}_CLIENT_ID").as_str()))?;

        if let Some(scope) = non_empty(lookup(format!("{prefix}_SCOPE").as_str())) {
            config.scope = scope;
        }

        let url_var = format!("{prefix}_AUTH_URL");
        if let Some(url) = non_empty(lookup(url_var.as_str())) {
            config.authorization_endpoint = parse_auth_url(&url_var, url)?;
        }

        Ok(config)
    }
}

/// Configuration for every supported provider plus the app origin.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub google: ProviderConfig,
    pub github: ProviderConfig,
    /// Scheme, host and port the app is served from, without a trailing slash.
    pub origin: String,
}

impl AuthConfig {
    /// Load configuration from the process environment (and `.env`, if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let origin = non_empty(lookup("APP_ORIGIN"))
            .unwrap_or_else(|| DEFAULT_ORIGIN.to_string());

        Ok(Self {
            google: ProviderConfig::from_lookup(Provider::Google, &lookup)?,
            github: ProviderConfig::from_lookup(Provider::GitHub, &lookup)?,
            origin: origin.trim_end_matches('/').to_string(),
        })
    }

    /// Configuration for one provider.
    pub fn provider(&self, provider: Provider) -> &ProviderConfig {
        match provider {
            Provider::Google => &self.google,
            Provider::GitHub => &self.github,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_auth_url(var: &str, url: String) -> Result<AuthUrl, ConfigError> {
    let auth_url = AuthUrl::new(url).map_err(|source| ConfigError::InvalidUrl {
        var: var.to_string(),
        source,
    })?;
    // Authorization parameters are appended as the query.
    if auth_url.url().query().is_some() || auth_url.url().fragment().is_some() {
        return Err(ConfigError::EndpointHasQuery {
            var: var.to_string(),
            url: auth_url.url().to_string(),
        });
    }
    Ok(auth_url)
}
