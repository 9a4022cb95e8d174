//! Language-understanding service.
//!
//! The pipeline talks to the model through the `LanguageModel` trait, with
//! two prompts: one to pick the imprint link out of a candidate list and one
//! to extract the legal fields from page text. `GeminiClient` implements the
//! trait against the Gemini REST API.

mod gemini;
pub mod prompts;

use async_trait::async_trait;

use crate::error_handling::LlmError;

pub use gemini::{GeminiClient, GEMINI_API_KEY_ENV};

/// A text-in, text-out language model.
///
/// Implementations own their retry and rate-limit handling; callers treat
/// any `Err` as final for this prompt.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Sends `prompt` and returns the model's text reply.
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}
