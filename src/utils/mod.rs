//! Utility functions shared across the pipeline stages.
//!
//! This module provides:
//! - String sanitization and char-safe truncation
//! - CSS selector parsing with a non-panicking fallback

pub mod sanitize;
mod selector;

pub use sanitize::{sanitize_and_truncate_error_message, truncate_at_whitespace, truncate_chars};
pub use selector::selector_or_empty;
