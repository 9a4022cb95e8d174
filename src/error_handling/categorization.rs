//! Error categorization and retry strategy.
//!
//! Maps transport errors onto `FetchError` and decides which failures are
//! worth another attempt.

use std::error::Error as StdError;
use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;

use super::types::FetchError;

/// Creates the exponential backoff used between fetch retries.
///
/// - Initial delay: `RETRY_INITIAL_DELAY_MS` milliseconds
/// - Backoff factor: `RETRY_FACTOR`
/// - Maximum delay: `RETRY_MAX_DELAY_SECS` seconds
/// - Length: `FETCH_MAX_RETRIES` (one delay per retry, so the total number of
///   attempts is `FETCH_MAX_RETRIES + 1`)
pub fn get_retry_strategy() -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(crate::config::RETRY_INITIAL_DELAY_MS)
        .factor(crate::config::RETRY_FACTOR)
        .max_delay(Duration::from_secs(crate::config::RETRY_MAX_DELAY_SECS))
        .take(crate::config::FETCH_MAX_RETRIES)
}

/// Categorizes a `reqwest::Error` into a `FetchError`.
///
/// TLS failures are detected by walking the source chain, because reqwest
/// reports them as connect errors wrapping the TLS backend's error.
pub fn categorize_reqwest_error(error: &reqwest::Error) -> FetchError {
    if let Some(status) = error.status() {
        return FetchError::HttpStatus(status.as_u16());
    }

    if error.is_timeout() {
        return FetchError::Timeout;
    }

    // The top-level message embeds the request URL, so only the sources are inspected.
    if error.source().is_some_and(is_tls_error) {
        return FetchError::TlsFailed(root_cause_message(error));
    }

    if error.is_connect() || error.is_request() {
        FetchError::ConnectionFailed(root_cause_message(error))
    } else {
        FetchError::Other(root_cause_message(error))
    }
}

/// Returns true when the error chain mentions a TLS or certificate failure.
pub fn is_tls_error(error: &(dyn StdError + 'static)) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(error);
    while let Some(err) = current {
        let msg = err.to_string().to_lowercase();
        if msg.contains("certificate")
            || msg.contains("tls")
            || msg.contains("ssl")
            || msg.contains("handshake")
        {
            return true;
        }
        current = err.source();
    }
    false
}

/// Returns the innermost error message, which is usually the informative one.
fn root_cause_message(error: &(dyn StdError + 'static)) -> String {
    let mut current: &(dyn StdError + 'static) = error;
    while let Some(source) = current.source() {
        current = source;
    }
    current.to_string()
}

/// Determines if a fetch failure is transient and should be retried.
///
/// Retriable: timeouts, connection failures, 5xx, and 429.
/// Not retriable: other 4xx, TLS failures (handled by the insecure fallback),
/// and everything else.
pub fn is_retriable_fetch_error(error: &FetchError) -> bool {
    match error {
        FetchError::Timeout | FetchError::ConnectionFailed(_) => true,
        FetchError::HttpStatus(status) => {
            *status == crate::config::HTTP_STATUS_TOO_MANY_REQUESTS || (500..600).contains(status)
        }
        FetchError::TlsFailed(_) | FetchError::Other(_) => false,
    }
}
