//! Testing utilities including fake collaborators.
//!
//! These let the locator, the field extractor, and the whole batch pipeline
//! run without network access or language model calls. Compiled for unit
//! tests and behind the `testing` feature.
//!
//! # Example
//!
//! ```rust,ignore
//! use imprint_reader::testing::{ScriptedModel, StaticFetcher};
//!
//! let fetcher = StaticFetcher::new()
//!     .with_page("https://a.de/", r#"<a href="/impressum">Impressum</a>"#)
//!     .with_page("https://a.de/impressum", "<p>Example GmbH</p>");
//! let model = ScriptedModel::new().with_fields_reply(r#"{"company_name": "Example GmbH"}"#);
//! ```

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::error_handling::{FetchError, LlmError};
use crate::fetch::{FetchedPage, PageFetcher};
use crate::llm::prompts::{FIELD_EXTRACTION_TASK, LINK_SELECTION_TASK};
use crate::llm::LanguageModel;

/// Canonical form used to key pages (`https://a.de` and `https://a.de/` match).
fn canonical(url: &str) -> String {
    Url::parse(url.trim())
        .map(|u| u.to_string())
        .unwrap_or_else(|_| url.trim().to_string())
}

/// A fetcher serving canned pages from memory.
///
/// URLs without a registered response answer `FetchError::HttpStatus(404)`.
#[derive(Default, Clone)]
pub struct StaticFetcher {
    responses: Arc<RwLock<HashMap<String, Result<FetchedPage, FetchError>>>>,
    delays: Arc<RwLock<HashMap<String, Duration>>>,
    requests: Arc<RwLock<Vec<String>>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `html` with status 200 at `url`.
    pub fn with_page(self, url: &str, html: impl Into<String>) -> Self {
        let page = FetchedPage::ok(canonical(url), html);
        self.with_response(url, Ok(page))
    }

    /// Fails every fetch of `url` with `error`.
    pub fn with_error(self, url: &str, error: FetchError) -> Self {
        self.with_response(url, Err(error))
    }

    /// Registers an arbitrary outcome for `url`.
    pub fn with_response(self, url: &str, response: Result<FetchedPage, FetchError>) -> Self {
        self.responses
            .write()
            .unwrap()
            .insert(canonical(url), response);
        self
    }

    /// Delays every fetch of `url`.
    pub fn with_delay(self, url: &str, delay: Duration) -> Self {
        self.delays.write().unwrap().insert(canonical(url), delay);
        self
    }

    /// URLs requested so far, in call order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.read().unwrap().clone()
    }

    /// Whether `url` was requested at least once.
    pub fn was_requested(&self, url: &str) -> bool {
        let url = canonical(url);
        self.requests.read().unwrap().iter().any(|r| *r == url)
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let key = canonical(url);
        self.requests.write().unwrap().push(key.clone());

        let delay = self.delays.read().unwrap().get(&key).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.responses
            .read()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or(Err(FetchError::HttpStatus(404)))
    }
}

/// A language model answering from a script.
///
/// Each rule pairs a prompt substring with a reply; the first rule whose
/// substring occurs in the prompt answers. Prompts matching no rule fail with
/// `LlmError::Transport`.
#[derive(Default, Clone)]
pub struct ScriptedModel {
    rules: Arc<RwLock<Vec<(String, Result<String, LlmError>)>>>,
    delay: Option<Duration>,
    prompts: Arc<RwLock<Vec<String>>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replies `reply` to prompts containing `needle`.
    pub fn on_prompt_containing(self, needle: impl Into<String>, reply: impl Into<String>) -> Self {
        self.rules
            .write()
            .unwrap()
            .push((needle.into(), Ok(reply.into())));
        self
    }

    /// Fails prompts containing `needle` with `error`.
    pub fn fail_on_prompt_containing(self, needle: impl Into<String>, error: LlmError) -> Self {
        self.rules.write().unwrap().push((needle.into(), Err(error)));
        self
    }

    /// Replies `reply` to every link-selection prompt.
    pub fn with_link_reply(self, reply: impl Into<String>) -> Self {
        self.on_prompt_containing(LINK_SELECTION_TASK, reply)
    }

    /// Replies `reply` to every field-extraction prompt.
    pub fn with_fields_reply(self, reply: impl Into<String>) -> Self {
        self.on_prompt_containing(FIELD_EXTRACTION_TASK, reply)
    }

    /// Delays every reply.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.read().unwrap().clone()
    }

    /// Number of link-selection prompts received.
    pub fn link_selection_calls(&self) -> usize {
        self.count_containing(LINK_SELECTION_TASK)
    }

    /// Number of field-extraction prompts received.
    pub fn field_extraction_calls(&self) -> usize {
        self.count_containing(FIELD_EXTRACTION_TASK)
    }

    fn count_containing(&self, needle: &str) -> usize {
        self.prompts
            .read()
            .unwrap()
            .iter()
            .filter(|p| p.contains(needle))
            .count()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.write().unwrap().push(prompt.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.rules
            .read()
            .unwrap()
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| Err(LlmError::Transport("no scripted reply".to_string())))
    }
}
