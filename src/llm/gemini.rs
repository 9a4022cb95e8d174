//! Gemini `generateContent` client.
//!
//! # Example
//!
//! ```rust,ignore
//! use imprint_reader::llm::GeminiClient;
//!
//! let model = GeminiClient::from_env()?.with_model("gemini-2.5-flash");
//! ```

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use rand::Rng;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tokio_retry::strategy::ExponentialBackoff;
use tokio_retry::RetryIf;

use super::LanguageModel;
use crate::config::{
    DEFAULT_MODEL, GEMINI_BASE_URL, LLM_MAX_ATTEMPTS, LLM_MAX_RATE_LIMIT_WAIT_SECS,
    LLM_TIMEOUT_SECS,
};
use crate::error_handling::LlmError;
use crate::utils::truncate_chars;

/// Environment variable holding the API key.
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Gemini REST client.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    max_attempts: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Deserialize, Default)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Default)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Default)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize, Default)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

/// One failed attempt and how long the server asked us to wait.
struct Failure {
    error: LlmError,
    retry_after: Option<Duration>,
}

impl From<LlmError> for Failure {
    fn from(error: LlmError) -> Self {
        Self {
            error,
            retry_after: None,
        }
    }
}

impl GeminiClient {
    /// Creates a client for the default model.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::MissingApiKey` for a blank key and
    /// `LlmError::Transport` if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::MissingApiKey);
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(LLM_TIMEOUT_SECS))
            .build()
            .map_err(|e| LlmError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            api_key,
            model: DEFAULT_MODEL.to_string(),
            base_url: GEMINI_BASE_URL.to_string(),
            max_attempts: LLM_MAX_ATTEMPTS,
        })
    }

    /// Creates a client from the `GEMINI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self, LlmError> {
        let api_key = std::env::var(GEMINI_API_KEY_ENV).map_err(|_| LlmError::MissingApiKey)?;
        Self::new(api_key)
    }

    /// Sets the model name (default: `gemini-2.5-flash`).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets a custom base URL (proxies, tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the number of attempts per prompt (at least one).
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Current model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    async fn generate_once(&self, prompt: &str) -> Result<String, Failure> {
        let request = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
            generation_config: GenerationConfig { temperature: 0.0 },
        };

        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url, self.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(|secs| Duration::from_secs(secs.min(LLM_MAX_RATE_LIMIT_WAIT_SECS)));
            return Err(Failure {
                error: LlmError::RateLimited,
                retry_after,
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body: truncate_chars(body.trim(), 200).to_string(),
            }
            .into());
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(LlmError::EmptyResponse.into());
        }
        Ok(text)
    }
}

/// Whether another attempt could succeed.
fn is_retriable(error: &LlmError) -> bool {
    match error {
        LlmError::RateLimited | LlmError::Transport(_) | LlmError::EmptyResponse => true,
        LlmError::Status { status, .. } => *status >= 500,
        LlmError::MissingApiKey => false,
    }
}

/// Scales a delay by a random factor in `[0.5, 1.5)`.
fn jitter(delay: Duration) -> Duration {
    delay.mul_f64(rand::rng().random_range(0.5..1.5))
}

/// Delays between attempts: 2s, 4s, 8s, ... capped at 16s, each jittered.
fn backoff_strategy(max_attempts: usize) -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(2)
        .factor(1000)
        .max_delay(Duration::from_secs(16))
        .map(jitter)
        .take(max_attempts.saturating_sub(1))
}

#[async_trait]
impl LanguageModel for GeminiClient {
    /// Sends the prompt, retrying rate limits, transport errors, 5xx and
    /// empty answers with jittered exponential backoff.
    ///
    /// A `Retry-After` on a 429 is waited out before the next attempt, in
    /// addition to the backoff delay.
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let attempt = AtomicUsize::new(0);
        let server_wait_ms = AtomicU64::new(0);
        let (attempt, server_wait_ms) = (&attempt, &server_wait_ms);
        let client = self;
        let max_attempts = client.max_attempts;

        let result = RetryIf::spawn(
            backoff_strategy(max_attempts),
            move || async move {
                let n = attempt.fetch_add(1, Ordering::SeqCst) + 1;
                let wait = server_wait_ms.swap(0, Ordering::SeqCst);
                if wait > 0 {
                    debug!("Waiting {wait}ms as requested by Retry-After");
                    tokio::time::sleep(Duration::from_millis(wait)).await;
                }

                client.generate_once(prompt).await.map_err(|failure| {
                    warn!(
                        "Language model call failed (attempt {}/{}): {}",
                        n, max_attempts, failure.error
                    );
                    if let Some(retry_after) = failure.retry_after {
                        let ms = u64::try_from(retry_after.as_millis()).unwrap_or(u64::MAX);
                        server_wait_ms.store(ms, Ordering::SeqCst);
                    }
                    failure
                })
            },
            |failure: &Failure| is_retriable(&failure.error),
        )
        .await;

        result.map_err(|failure| failure.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httptest::{all_of, matchers::*, responders::*, Expectation, Server};

    const PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

    fn client_for(server: &Server) -> GeminiClient {
        GeminiClient::new("test-key")
            .unwrap()
            .with_base_url(server.url_str("/v1beta"))
    }

    #[test]
    fn test_blank_api_key_rejected() {
        assert!(matches!(
            GeminiClient::new("  "),
            Err(LlmError::MissingApiKey)
        ));
    }

    #[tokio::test]
    async fn test_generate_returns_candidate_text() {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("POST", PATH),
                request::headers(contains(("x-goog-api-key", "test-key"))),
                request::body(json_decoded(|body: &serde_json::Value| {
                    body["contents"][0]["parts"][0]["text"] == "hello"
                })),
            ])
            .respond_with(json_encoded(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": "https://a.de/"}, {"text": "impressum"}]}}]
            }))),
        );

        let text = client_for(&server).generate("hello").await.unwrap();
        assert_eq!(text, "https://a.de/impressum");
    }

    #[tokio::test]
    async fn test_rate_limit_honours_retry_after_then_fails() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("POST", PATH))
                .times(2)
                .respond_with(status_code(429).append_header("Retry-After", "0")),
        );

        let err = client_for(&server).generate("hello").await.unwrap_err();
        assert_eq!(err, LlmError::RateLimited);
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("POST", PATH))
                .times(1)
                .respond_with(status_code(400).body("bad request")),
        );

        let err = client_for(&server).generate("hello").await.unwrap_err();
        assert_eq!(
            err,
            LlmError::Status {
                status: 400,
                body: "bad request".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_empty_candidates() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("POST", PATH))
                .times(1)
                .respond_with(json_encoded(serde_json::json!({"candidates": []}))),
        );

        let err = client_for(&server)
            .with_max_attempts(1)
            .generate("hello")
            .await
            .unwrap_err();
        assert_eq!(err, LlmError::EmptyResponse);
    }

    #[test]
    fn test_backoff_strategy_bounds() {
        let delays: Vec<Duration> = backoff_strategy(4).collect();
        assert_eq!(delays.len(), 3);
        for (i, delay) in delays.iter().enumerate() {
            let base = f64::from(2u32.pow(i as u32 + 1));
            let secs = delay.as_secs_f64();
            assert!(secs >= base * 0.5 && secs < base * 1.5, "delay {i}: {secs}");
        }
    }

    #[test]
    fn test_single_attempt_has_no_backoff() {
        assert_eq!(backoff_strategy(1).count(), 0);
    }

    #[tokio::test]
    async fn test_server_error_is_retried_then_succeeds() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("POST", PATH))
                .times(2)
                .respond_with(httptest::cycle![
                    status_code(503).body("overloaded"),
                    json_encoded(serde_json::json!({
                        "candidates": [{"content": {"parts": [{"text": "https://a.de/impressum"}]}}]
                    })),
                ]),
        );

        let text = client_for(&server).generate("hello").await.unwrap();
        assert_eq!(text, "https://a.de/impressum");
    }
}
