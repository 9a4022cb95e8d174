//! `reqwest`-backed fetcher.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use tokio_retry::RetryIf;

use super::request::RequestHeaders;
use super::response::read_body_capped;
use super::{FetchedPage, PageFetcher};
use crate::config::{Config, MAX_RESPONSE_BODY_SIZE};
use crate::error_handling::{
    categorize_reqwest_error, get_retry_strategy, is_retriable_fetch_error, FetchError,
    InitializationError,
};
use crate::initialization::{init_client, init_insecure_client};

/// Fetches pages over HTTP(S).
///
/// Cloning is cheap; both clients share their connection pools.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    insecure_client: Client,
    timeout: Duration,
    max_body_bytes: usize,
}

impl HttpFetcher {
    /// Builds a fetcher from the configuration's timeout and user agent.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::HttpClientError` if a client cannot be built.
    pub fn new(config: &Config) -> Result<Self, InitializationError> {
        Ok(Self {
            client: init_client(config)?,
            insecure_client: init_insecure_client(config)?,
            timeout: Duration::from_secs(config.fetch_timeout_seconds),
            max_body_bytes: MAX_RESPONSE_BODY_SIZE,
        })
    }

    /// Overrides the response size cap.
    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    /// One request/response cycle, bounded by the per-attempt timeout.
    async fn fetch_once(
        &self,
        client: &Client,
        url: &str,
        insecure_tls: bool,
    ) -> Result<FetchedPage, FetchError> {
        let attempt = async {
            let response = RequestHeaders::apply_to_request_builder(client.get(url))
                .send()
                .await
                .map_err(|e| categorize_reqwest_error(&e))?;

            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::HttpStatus(status.as_u16()));
            }
            let final_url = response.url().to_string();
            let content = read_body_capped(response, self.max_body_bytes).await?;

            Ok(FetchedPage {
                status: status.as_u16(),
                content,
                final_url,
                insecure_tls,
                attempts: 1,
            })
        };

        match tokio::time::timeout(self.timeout, attempt).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout),
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let attempts = AtomicU32::new(0);

        let result = RetryIf::spawn(
            get_retry_strategy(),
            || {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                if n > 0 {
                    debug!("Retrying {url} (attempt {})", n + 1);
                }
                self.fetch_once(&self.client, url, false)
            },
            is_retriable_fetch_error,
        )
        .await;

        let result = match result {
            Err(FetchError::TlsFailed(reason)) => {
                warn!("TLS failure for {url} ({reason}); retrying without certificate verification");
                attempts.fetch_add(1, Ordering::SeqCst);
                self.fetch_once(&self.insecure_client, url, true).await
            }
            other => other,
        };

        let attempts = attempts.load(Ordering::SeqCst);
        match result {
            Ok(mut page) => {
                page.attempts = attempts;
                if page.insecure_tls {
                    warn!("Fetched {url} with certificate verification disabled");
                }
                Ok(page)
            }
            Err(e) => {
                debug!("Fetch of {url} failed after {attempts} attempt(s): {e}");
                Err(e)
            }
        }
    }
}
