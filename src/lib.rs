//! imprint_reader library: legal imprint discovery and extraction
//!
//! This library locates the imprint ("Impressum", legal notice) page of
//! company websites and extracts the operator's legal and contact details
//! (company name, managing directors, address, phone, email, register number,
//! VAT ID) with a language model, for batches of up to 100 URLs at a time.
//!
//! Per URL, the pipeline fetches the homepage, locates the imprint page (keyword
//! scoring, model-assisted link selection, one hop through legal hub pages,
//! well-known path probing), normalizes the page to markdown-like text, and
//! extracts the fields. Individual failures are recorded per URL and never
//! fail the batch.
//!
//! # Example
//!
//! ```no_run
//! use imprint_reader::{BatchRequest, Config, ImprintExtractor};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     max_concurrency: 4,
//!     ..Default::default()
//! };
//!
//! // Reads GEMINI_API_KEY from the environment
//! let extractor = ImprintExtractor::new(config)?;
//! let batch = extractor
//!     .process_batch(BatchRequest {
//!         urls: vec!["example.de".to_string()],
//!     })
//!     .await?;
//! println!("{} of {} succeeded", batch.successful_extractions, batch.total_urls);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

mod app;
mod batch;
pub mod config;
mod error_handling;
pub mod extract;
pub mod fetch;
pub mod initialization;
pub mod llm;
pub mod locate;
mod models;
pub mod parse;
pub mod server;
pub mod storage;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
mod utils;

// Re-export public API
pub use app::validate_and_normalize_url;
pub use batch::ImprintExtractor;
pub use config::{Config, LogFormat, LogLevel};
pub use error_handling::{
    ErrorType, ExtractionError, FetchError, InfoType, InitializationError, LlmError,
    PipelineError, ProcessingStats, ValidationError, WarningType,
};
pub use models::{
    success_rate, BatchRequest, BatchResult, ImprintFields, ImprintResult, LinkCandidate,
    ResultDiagnostics,
};
