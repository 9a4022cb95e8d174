//! Application helpers shared by the orchestrator and the binary.
//!
//! This module provides URL normalization, progress logging, and statistics
//! printing.

pub mod logging;
pub mod statistics;
pub mod url;

// Re-export public API
pub use logging::log_progress;
pub use statistics::{print_batch_summary, print_error_statistics};
pub use url::{origin_of, same_site, validate_and_normalize_url};
