//! Prints the "continue with provider" sign-in links for the configured app.
//!
//! ```text
//! signin            # every provider
//! signin github     # just one
//! ```
//!
//! Configuration comes from the environment (and `.env`), see `auth::config`.

use std::process::ExitCode;

use auth::{AuthConfig, OAuthUrlBuilder, Provider};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match AuthConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut providers: Vec<String> = std::env::args().skip(1).collect();
    if providers.is_empty() {
        providers = Provider::ALL.iter().map(|p| p.to_string()).collect();
    }

    let builder = OAuthUrlBuilder::new(&config);
    tracing::info!(origin = %config.origin, "Building sign-in links");

    let mut failed = false;
    for provider in &providers {
        match builder.build_for(provider) {
            Ok(url) => println!("{provider}\t{url}"),
            Err(e) => {
                tracing::error!("Error generating {} OAuth URL: {}", provider, e);
                failed = true;
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
