//! Page fetching.
//!
//! This module provides the `PageFetcher` seam used by the locator and the
//! pipeline, and `HttpFetcher`, its `reqwest` implementation with:
//! - bounded retries with exponential backoff for transient failures
//! - a single insecure-TLS fallback after a certificate failure
//! - a per-attempt timeout and a response size cap

mod http;
mod request;
mod response;

use async_trait::async_trait;

use crate::error_handling::FetchError;

pub use http::HttpFetcher;

/// A successfully fetched page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// Final HTTP status (always 2xx for pages returned by `HttpFetcher`)
    pub status: u16,
    /// Decoded body text
    pub content: String,
    /// URL after redirects
    pub final_url: String,
    /// The page was fetched with certificate verification disabled
    pub insecure_tls: bool,
    /// Number of requests sent, including retries and the TLS fallback
    pub attempts: u32,
}

impl FetchedPage {
    /// Builds a plain 200 page, as served by test fakes.
    pub fn ok(final_url: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            status: 200,
            content: content.into(),
            final_url: final_url.into(),
            insecure_tls: false,
            attempts: 1,
        }
    }
}

/// Retrieves pages by URL.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches `url`, returning the page or the categorized failure.
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}
