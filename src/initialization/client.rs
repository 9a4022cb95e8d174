//! HTTP client initialization.
//!
//! Two clients are built per extractor: the default one verifies certificates,
//! the insecure one is only used as a fallback after a TLS failure.

use std::time::Duration;

use reqwest::{redirect::Policy, Client, ClientBuilder};

use crate::config::{Config, MAX_REDIRECT_HOPS, TCP_CONNECT_TIMEOUT_SECS};
use crate::error_handling::InitializationError;

fn base_builder(config: &Config) -> ClientBuilder {
    ClientBuilder::new()
        .timeout(Duration::from_secs(config.fetch_timeout_seconds))
        .connect_timeout(Duration::from_secs(TCP_CONNECT_TIMEOUT_SECS))
        .user_agent(config.user_agent.clone())
        .redirect(Policy::limited(MAX_REDIRECT_HOPS))
}

/// Initializes the HTTP client with default settings.
///
/// Creates a `reqwest::Client` configured with:
/// - User-Agent header from the configuration
/// - Request timeout from the configuration, plus a short connect timeout
/// - Redirect following enabled (up to `MAX_REDIRECT_HOPS`)
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if client creation fails.
pub fn init_client(config: &Config) -> Result<Client, InitializationError> {
    Ok(base_builder(config).build()?)
}

/// Initializes the fallback client that accepts invalid certificates.
///
/// Identical to `init_client` except that certificate and hostname
/// verification are disabled.
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if client creation fails.
pub fn init_insecure_client(config: &Config) -> Result<Client, InitializationError> {
    Ok(base_builder(config)
        .danger_accept_invalid_certs(true)
        .danger_accept_invalid_hostnames(true)
        .build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_clients() {
        let config = Config::default();
        assert!(init_client(&config).is_ok());
        assert!(init_insecure_client(&config).is_ok());
    }
}
