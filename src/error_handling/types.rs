//! Error type definitions.
//!
//! This module defines the typed errors of each pipeline stage and the
//! error, warning, and info categories tracked in processing statistics.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Request-level validation failures.
///
/// These are the only errors that fail a whole batch; they are raised before any
/// URL is processed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The request contained no URLs.
    #[error("No URLs provided")]
    Empty,

    /// The request exceeded the maximum batch size.
    #[error("Maximum {max} URLs allowed per request")]
    TooMany {
        /// Number of URLs submitted
        count: usize,
        /// Maximum accepted
        max: usize,
    },
}

/// Failures of a single page fetch, after retries and TLS fallback.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The fetch exceeded its timeout.
    #[error("request timed out")]
    Timeout,

    /// The connection could not be established or was reset.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// TLS handshake or certificate validation failed, including over the
    /// insecure fallback channel.
    #[error("TLS failure: {0}")]
    TlsFailed(String),

    /// The server answered with a non-success status.
    #[error("HTTP status {0}")]
    HttpStatus(u16),

    /// Any other transport failure (redirect loop, body decode, builder error).
    #[error("{0}")]
    Other(String),
}

/// Failures of the language-understanding service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    /// The service asked us to slow down.
    #[error("language model rate limited")]
    RateLimited,

    /// No API key was configured.
    #[error("language model API key not set")]
    MissingApiKey,

    /// The request could not be sent or the response could not be read.
    #[error("language model transport error: {0}")]
    Transport(String),

    /// The service answered with an error status.
    #[error("language model returned status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Truncated response body
        body: String,
    },

    /// The service answered without any text.
    #[error("language model returned an empty response")]
    EmptyResponse,
}

/// Failures of structured field extraction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// The normalized page content was empty.
    #[error("no extractable content")]
    NoContent,

    /// The language model call failed.
    #[error("{0}")]
    Service(#[from] LlmError),

    /// The reply could not be decoded into the field schema.
    #[error("malformed model output: {0}")]
    Malformed(String),
}

/// Per-URL pipeline failures.
///
/// Each variant renders into the short, human-readable `error_message` of a
/// failed result. None of them fail the batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// The input could not be normalized into an http(s) URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The homepage could not be fetched.
    #[error("Failed to fetch homepage: {0}")]
    Homepage(FetchError),

    /// The locator exhausted every strategy.
    #[error("No imprint page found")]
    NoImprintFound,

    /// Field extraction failed.
    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    /// The per-URL budget was exceeded.
    #[error("Processing timeout")]
    Timeout,

    /// The batch budget was exceeded before this URL finished.
    #[error("Batch timeout")]
    BatchTimeout,

    /// The pipeline task panicked or was aborted.
    #[error("Processing exception: {0}")]
    Exception(String),
}

impl PipelineError {
    /// Maps the failure onto its statistics category.
    pub fn error_type(&self) -> ErrorType {
        match self {
            PipelineError::InvalidUrl(_) => ErrorType::InvalidUrl,
            PipelineError::Homepage(FetchError::Timeout) => ErrorType::FetchTimeout,
            PipelineError::Homepage(FetchError::ConnectionFailed(_)) => {
                ErrorType::FetchConnectionFailed
            }
            PipelineError::Homepage(FetchError::TlsFailed(_)) => ErrorType::FetchTlsFailed,
            PipelineError::Homepage(FetchError::HttpStatus(_)) => ErrorType::FetchHttpStatus,
            PipelineError::Homepage(FetchError::Other(_)) => ErrorType::FetchOther,
            PipelineError::NoImprintFound => ErrorType::NoImprintFound,
            PipelineError::Extraction(ExtractionError::NoContent) => ErrorType::EmptyImprintContent,
            PipelineError::Extraction(ExtractionError::Service(LlmError::RateLimited)) => {
                ErrorType::LlmRateLimited
            }
            PipelineError::Extraction(ExtractionError::Service(_)) => ErrorType::LlmServiceError,
            PipelineError::Extraction(ExtractionError::Malformed(_)) => ErrorType::MalformedModelOutput,
            PipelineError::Timeout => ErrorType::ProcessUrlTimeout,
            PipelineError::BatchTimeout => ErrorType::BatchTimeout,
            PipelineError::Exception(_) => ErrorType::ProcessingException,
        }
    }
}

/// Types of errors that can occur during URL processing.
///
/// Each failed result is counted under exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    InvalidUrl,
    // Homepage fetch errors
    FetchTimeout,
    FetchConnectionFailed,
    FetchTlsFailed,
    FetchHttpStatus,
    FetchOther,
    // Locator
    NoImprintFound,
    // Field extraction
    EmptyImprintContent,
    LlmRateLimited,
    LlmServiceError,
    MalformedModelOutput,
    // Budgets
    ProcessUrlTimeout,
    BatchTimeout,
    ProcessingException,
}

/// Types of warnings that can occur during URL processing.
///
/// Warnings are degraded-but-successful outcomes worth tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum WarningType {
    InsecureTlsFallback,   // Page fetched only after disabling certificate checks
    EmptyExtraction,       // Model answered with no populated field
    LinkSelectionFailed,   // Model call for link selection failed
    HallucinatedLink,      // Model picked a URL that is not on the page
}

/// Types of informational metrics that can occur during URL processing.
///
/// Info metrics record which locator strategy produced the imprint URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum InfoType {
    KeywordMatch,   // A direct imprint link matched by keyword
    AiSelection,    // The model picked the imprint link
    HubHop,         // The imprint was reached through a legal hub
    HubAccepted,    // A legal hub page was used as the imprint page
    PathFallback,   // A probed fallback path answered
    FetchRetried,   // At least one fetch needed a retry
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::InvalidUrl => "Invalid URL",
            ErrorType::FetchTimeout => "Homepage fetch timeout",
            ErrorType::FetchConnectionFailed => "Homepage connection failed",
            ErrorType::FetchTlsFailed => "Homepage TLS failure",
            ErrorType::FetchHttpStatus => "Homepage HTTP error status",
            ErrorType::FetchOther => "Homepage fetch error",
            ErrorType::NoImprintFound => "No imprint page found",
            ErrorType::EmptyImprintContent => "Empty imprint content",
            ErrorType::LlmRateLimited => "Language model rate limited",
            ErrorType::LlmServiceError => "Language model error",
            ErrorType::MalformedModelOutput => "Malformed model output",
            ErrorType::ProcessUrlTimeout => "Process URL timeout",
            ErrorType::BatchTimeout => "Batch timeout",
            ErrorType::ProcessingException => "Processing exception",
        }
    }
}

impl WarningType {
    /// Returns a human-readable string representation of the warning type.
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningType::InsecureTlsFallback => "Insecure TLS fallback used",
            WarningType::EmptyExtraction => "Extraction returned no fields",
            WarningType::LinkSelectionFailed => "Link selection call failed",
            WarningType::HallucinatedLink => "Model selected unknown link",
        }
    }
}

impl InfoType {
    /// Returns a human-readable string representation of the info type.
    pub fn as_str(&self) -> &'static str {
        match self {
            InfoType::KeywordMatch => "Imprint found by keyword",
            InfoType::AiSelection => "Imprint selected by model",
            InfoType::HubHop => "Imprint reached through legal hub",
            InfoType::HubAccepted => "Legal hub used as imprint",
            InfoType::PathFallback => "Imprint found by path probing",
            InfoType::FetchRetried => "Fetch retried",
        }
    }
}
