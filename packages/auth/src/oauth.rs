//! # OAuth authorization URL construction
//!
//! Builds the browser-navigable URL that starts an authorization-code flow at
//! Google or GitHub. Only the initial request is assembled here: there is no
//! token exchange, no PKCE and no `state` parameter.
//!
//! ## Parameter sets
//!
//! | Provider | Parameters (in order) |
//! |----------|-----------------------|
//! | Google | `client_id`, `redirect_uri`, `response_type=code`, `scope`, `access_type=offline`, `prompt=consent` |
//! | GitHub | `client_id`, `redirect_uri`, `scope` |
//!
//! The sets are fixed in code so callers cannot inject extra parameters. The
//! order is stable, which keeps the produced URLs comparable in tests.
//!
//! `redirect_uri` is always `{origin}/auth/{provider}`. The query string is
//! `application/x-www-form-urlencoded`, so spaces in the scope become `+`.

use thiserror::Error;
use url::Url;

use crate::config::{AuthConfig, ProviderConfig};
use crate::provider::Provider;

/// Reasons an authorization URL could not be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuilderError {
    #[error("{0} client ID is not configured")]
    MissingClientId(Provider),
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),
    #[error("Failed to assemble {provider} authorization URL: {reason}")]
    InvalidUrl { provider: Provider, reason: String },
}

type FixedParams = &'static [(&'static str, &'static str)];

/// Extra parameters a provider always receives after `redirect_uri`.
///
/// Google wants `response_type` between `redirect_uri` and `scope`, so the
/// list is split into the parts before and after `scope`.
fn fixed_params(provider: Provider) -> (FixedParams, FixedParams) {
    match provider {
        Provider::Google => (
            &[("response_type", "code")],
            &[("access_type", "offline"), ("prompt", "consent")],
        ),
        Provider::GitHub => (&[], &[]),
    }
}

/// The ordered query parameters of an authorization request.
pub fn authorization_params(
    provider: Provider,
    config: &ProviderConfig,
    origin: &str,
) -> Result<Vec<(&'static str, String)>, BuilderError> {
    let client_id = config
        .client_id
        .as_ref()
        .map(|id| id.as_str())
        .filter(|id| !id.trim().is_empty())
        .ok_or(BuilderError::MissingClientId(provider))?;

    let redirect_uri = format!(
        "{}{}",
        origin.trim_end_matches('/'),
        provider.callback_path()
    );
    let (before_scope, after_scope) = fixed_params(provider);

    let mut params = vec![("client_id", client_id.to_string()), ("redirect_uri", redirect_uri)];
    params.extend(before_scope.iter().map(|(k, v)| (*k, v.to_string())));
    params.push(("scope", config.scope.clone()));
    params.extend(after_scope.iter().map(|(k, v)| (*k, v.to_string())));

    Ok(params)
}

/// Build the authorization URL for `provider`.
///
/// Fails with [`BuilderError::MissingClientId`] before anything is assembled
/// if the client id is absent or blank. An endpoint that already carries a
/// query or fragment is rejected rather than merged.
pub fn build_authorization_url(
    provider: Provider,
    config: &ProviderConfig,
    origin: &str,
) -> Result<Url, BuilderError> {
    let params = authorization_params(provider, config, origin)?;

    let endpoint = config.authorization_endpoint.url();
    if endpoint.query().is_some() || endpoint.fragment().is_some() {
        return Err(BuilderError::InvalidUrl {
            provider,
            reason: format!("endpoint {endpoint} must not have a query or fragment"),
        });
    }

    let mut url = endpoint.clone();
    url.query_pairs_mut()
        .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));
    Ok(url)
}

/// Builds authorization URLs against one configuration and origin.
#[derive(Debug, Clone, Copy)]
pub struct OAuthUrlBuilder<'a> {
    config: &'a AuthConfig,
    origin: &'a str,
}

impl<'a> OAuthUrlBuilder<'a> {
    /// Builder for the configured origin.
    pub fn new(config: &'a AuthConfig) -> Self {
        Self {
            config,
            origin: &config.origin,
        }
    }

    /// Builder for an explicit origin, e.g. the one the page was loaded from.
    pub fn with_origin(config: &'a AuthConfig, origin: &'a str) -> Self {
        Self { config, origin }
    }

    /// Authorization URL for a known provider.
    pub fn build(&self, provider: Provider) -> Result<Url, BuilderError> {
        build_authorization_url(provider, self.config.provider(provider), self.origin)
    }

    /// Authorization URL for a provider given by its identifier.
    pub fn build_for(&self, provider: &str) -> Result<Url, BuilderError> {
        self.build(provider.parse()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "https://app.example.com";

    fn config_with(google: Option<&str>, github: Option<&str>) -> AuthConfig {
        AuthConfig {
            google: ProviderConfig::new(Provider::Google, google.map(String::from)).unwrap(),
            github: ProviderConfig::new(Provider::GitHub, github.map(String::from)).unwrap(),
            origin: ORIGIN.to_string(),
        }
    }

    fn query_pairs(url: &Url) -> Vec<(String, String)> {
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn test_google_url_exact() {
        let config = config_with(Some("abc"), None).google.with_scope("openid email profile");
        let url = build_authorization_url(Provider::Google, &config, ORIGIN).unwrap();
        assert_eq!(
            url.as_str(),
            "https://accounts.google.com/o/oauth2/v2/auth?client_id=abc&redirect_uri=https%3A%2F%2Fapp.example.com%2Fauth%2Fgoogle&response_type=code&scope=openid+email+profile&access_type=offline&prompt=consent"
        );
    }

    #[test]
    fn test_github_url_exact() {
        let config = config_with(None, Some("gh-123"));
        let url = OAuthUrlBuilder::new(&config).build(Provider::GitHub).unwrap();
        assert_eq!(
            url.as_str(),
            "https://github.com/login/oauth/authorize?client_id=gh-123&redirect_uri=https%3A%2F%2Fapp.example.com%2Fauth%2Fgithub&scope=user%3Aemail"
        );
    }

    #[test]
    fn test_params_match_fixed_set() {
        let config = config_with(Some("g"), Some("h"));
        let builder = OAuthUrlBuilder::new(&config);

        let google = query_pairs(&builder.build(Provider::Google).unwrap());
        let keys: Vec<&str> = google.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            ["client_id", "redirect_uri", "response_type", "scope", "access_type", "prompt"]
        );
        assert_eq!(google[1].1, "https://app.example.com/auth/google");

        let github = query_pairs(&builder.build(Provider::GitHub).unwrap());
        let keys: Vec<&str> = github.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["client_id", "redirect_uri", "scope"]);
        assert_eq!(github[1].1, "https://app.example.com/auth/github");
        assert_eq!(github[2].1, "user:email");
    }

    #[test]
    fn test_missing_client_id() {
        let config = config_with(None, None);
        let builder = OAuthUrlBuilder::new(&config);
        assert_eq!(
            builder.build(Provider::Google),
            Err(BuilderError::MissingClientId(Provider::Google))
        );
        assert_eq!(
            builder.build(Provider::GitHub),
            Err(BuilderError::MissingClientId(Provider::GitHub))
        );
    }

    #[test]
    fn test_blank_client_id_set_directly() {
        let mut config = config_with(None, None).github;
        for id in ["", "   "] {
            config.client_id = Some(oauth2::ClientId::new(id.to_string()));
            assert_eq!(
                build_authorization_url(Provider::GitHub, &config, ORIGIN),
                Err(BuilderError::MissingClientId(Provider::GitHub))
            );
        }
    }

    #[test]
    fn test_unknown_provider() {
        let config = config_with(Some("g"), Some("h"));
        let builder = OAuthUrlBuilder::new(&config);
        assert_eq!(
            builder.build_for("twitter"),
            Err(BuilderError::UnknownProvider("twitter".to_string()))
        );
        assert!(builder.build_for("github").is_ok());
    }

    #[test]
    fn test_endpoint_with_query_or_fragment_is_rejected() {
        for endpoint in [
            "https://gh.example/authorize?x=1#frag",
            "https://gh.example/authorize?x=1",
            "https://gh.example/authorize#frag",
        ] {
            let config = config_with(None, Some("id"))
                .github
                .with_endpoint(oauth2::AuthUrl::new(endpoint.to_string()).unwrap());
            let err = build_authorization_url(Provider::GitHub, &config, ORIGIN).unwrap_err();
            assert!(
                matches!(err, BuilderError::InvalidUrl { provider: Provider::GitHub, .. }),
                "{endpoint}: {err:?}"
            );
        }
    }

    #[test]
    fn test_custom_endpoint_keeps_path() {
        let config = config_with(None, Some("id"))
            .github
            .with_endpoint(
                oauth2::AuthUrl::new("https://gh.example/login/oauth/authorize".to_string())
                    .unwrap(),
            );
        let url = build_authorization_url(Provider::GitHub, &config, ORIGIN).unwrap();
        assert_eq!(url.path(), "/login/oauth/authorize");
        assert_eq!(url.fragment(), None);
        assert_eq!(query_pairs(&url)[0], ("client_id".to_string(), "id".to_string()));
    }

    #[test]
    fn test_explicit_origin_and_custom_scope() {
        let mut config = config_with(Some("g"), None);
        config.google = config.google.with_scope("openid");
        let url = OAuthUrlBuilder::with_origin(&config, "http://localhost:3000/")
            .build(Provider::Google)
            .unwrap();
        let pairs = query_pairs(&url);
        assert_eq!(pairs[1].1, "http://localhost:3000/auth/google");
        assert_eq!(pairs[3].1, "openid");
    }
}
