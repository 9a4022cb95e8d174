//! Configuration constants.
//!
//! This module defines the constants used throughout the pipeline, including
//! batch limits, timeouts, retry policy, and size bounds.

use std::time::Duration;

// Batch limits
/// Maximum number of URLs accepted in a single request.
pub const MAX_BATCH_SIZE: usize = 100;
/// Default number of URL pipelines running at once.
///
/// Kept low because every pipeline makes up to two language model calls.
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;
/// Completed URLs between two progress log lines.
pub const PROGRESS_LOG_EVERY: usize = 10;

// Wall-clock budgets
/// Per-URL processing timeout (fetches + locator + field extraction).
pub const URL_PROCESSING_TIMEOUT: Duration = Duration::from_secs(90);
/// Whole-batch processing timeout.
pub const BATCH_PROCESSING_TIMEOUT: Duration = Duration::from_secs(600);
/// Per-fetch timeout in seconds (one HTTP attempt).
pub const FETCH_TIMEOUT_SECS: u64 = 15;
/// TCP connection timeout in seconds
pub const TCP_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Default User-Agent string for HTTP requests.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

// Response and body size limits
/// Maximum response body size in bytes (2MB)
pub const MAX_RESPONSE_BODY_SIZE: usize = 2 * 1024 * 1024;
/// Maximum URL length accepted as input.
pub const MAX_URL_LENGTH: usize = 2048;

// Redirect handling
/// Maximum number of redirect hops the transport follows per fetch.
pub const MAX_REDIRECT_HOPS: usize = 10;

// Retry strategy
/// Initial delay in milliseconds before first retry
pub const RETRY_INITIAL_DELAY_MS: u64 = 500;
/// Factor by which retry delay is multiplied on each attempt
pub const RETRY_FACTOR: u64 = 2;
/// Maximum delay between retries in seconds
pub const RETRY_MAX_DELAY_SECS: u64 = 5;
/// Number of retries after the initial fetch attempt.
pub const FETCH_MAX_RETRIES: usize = 2;

// Content bounds
/// Maximum normalized imprint text length in characters.
pub const MAX_NORMALIZED_CHARS: usize = 10_000;
/// Maximum characters of normalized text placed into the extraction prompt.
pub const MAX_PROMPT_CONTENT_CHARS: usize = 8_000;
/// Maximum number of link candidates shown to the language model.
pub const MAX_PROMPT_LINKS: usize = 60;
/// Maximum list entries kept when joining phone numbers or emails.
pub const MAX_JOINED_LIST_ITEMS: usize = 3;
/// Maximum length of one extracted field value in characters.
pub const MAX_FIELD_CHARS: usize = 200;

// Error message limits
/// Maximum `error_message` length in characters.
pub const MAX_ERROR_MESSAGE_LENGTH: usize = 500;

// Language model
/// Default Gemini model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
/// Gemini REST base URL.
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Language model request timeout in seconds.
pub const LLM_TIMEOUT_SECS: u64 = 45;
/// Language model attempts (initial + retries).
pub const LLM_MAX_ATTEMPTS: usize = 2;
/// Upper bound on how long a rate-limited call waits before its retry.
pub const LLM_MAX_RATE_LIMIT_WAIT_SECS: u64 = 20;

// Locator policy
/// Default number of extra hops allowed through a "legal" hub page.
pub const DEFAULT_MAX_HUB_HOPS: usize = 1;

// Persistence
/// Number of results kept in the rolling JSON extraction log.
pub const ROLLING_LOG_CAPACITY: usize = 1000;

// HTTP status codes (for clarity and consistency)
pub const HTTP_STATUS_TOO_MANY_REQUESTS: u16 = 429;
