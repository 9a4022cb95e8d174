//! HTML parsing.
//!
//! This module turns fetched markup into the two shapes the pipeline needs:
//! - Link candidates for the imprint locator
//! - Bounded markdown-like text for field extraction
//!
//! All parsing is done via the `scraper` crate and never fails; unusable
//! input yields an empty result.

mod links;
mod normalize;

// Re-export public API
pub use links::extract_links;
pub use normalize::normalize;
