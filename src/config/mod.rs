//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (timeouts, limits, retry policy)
//! - Locator keyword tables
//! - The library `Config` and logging option types

mod constants;
mod keywords;
mod types;

// Re-export all constants
pub use constants::*;
pub use keywords::*;
pub use types::{Config, LogFormat, LogLevel};
