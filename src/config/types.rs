//! Configuration types.
//!
//! This module defines the library configuration and the logging enums shared
//! with the command-line wrapper.

use std::time::Duration;

use clap::ValueEnum;

use crate::config::constants::{
    BATCH_PROCESSING_TIMEOUT, DEFAULT_MAX_CONCURRENCY, DEFAULT_MAX_HUB_HOPS, DEFAULT_MODEL,
    DEFAULT_USER_AGENT, FETCH_TIMEOUT_SECS, MAX_NORMALIZED_CHARS, URL_PROCESSING_TIMEOUT,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON lines for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Library configuration (no CLI dependencies).
///
/// # Examples
///
/// ```no_run
/// use imprint_reader::Config;
/// use std::time::Duration;
///
/// let config = Config {
///     max_concurrency: 4,
///     url_timeout: Duration::from_secs(60),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum URL pipelines running concurrently
    pub max_concurrency: usize,

    /// Wall-clock budget for one URL's whole pipeline
    pub url_timeout: Duration,

    /// Wall-clock budget for the whole batch
    pub batch_timeout: Duration,

    /// Timeout for a single HTTP fetch attempt, in seconds
    pub fetch_timeout_seconds: u64,

    /// HTTP User-Agent header value
    pub user_agent: String,

    /// Extra hops allowed through a "legal" hub page
    pub max_hub_hops: usize,

    /// Maximum characters kept by the content normalizer
    pub max_content_chars: usize,

    /// Language model name
    pub model: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            url_timeout: URL_PROCESSING_TIMEOUT,
            batch_timeout: BATCH_PROCESSING_TIMEOUT,
            fetch_timeout_seconds: FETCH_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_hub_hops: DEFAULT_MAX_HUB_HOPS,
            max_content_chars: MAX_NORMALIZED_CHARS,
            model: DEFAULT_MODEL.to_string(),
        }
    }
}
