//! Batch orchestration.
//!
//! `ImprintExtractor::process_batch` validates a request, runs one pipeline
//! task per URL on a bounded pool, enforces the per-URL and whole-batch
//! deadlines, and aggregates the results in input order. Individual URL
//! failures never fail the batch; only request validation does.

mod pipeline;
mod task;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use log::{info, warn};
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;

use crate::app::{log_progress, print_batch_summary, print_error_statistics};
use crate::config::{Config, MAX_BATCH_SIZE, PROGRESS_LOG_EVERY};
use crate::error_handling::{PipelineError, ProcessingStats, ValidationError};
use crate::extract::FieldExtractor;
use crate::fetch::{HttpFetcher, PageFetcher};
use crate::initialization::init_semaphore;
use crate::llm::{GeminiClient, LanguageModel};
use crate::locate::ImprintLocator;
use crate::models::{BatchRequest, BatchResult, ImprintResult};
use crate::storage::ResultSink;

use pipeline::ProcessingContext;
use task::{process_url_task, UrlTaskParams};

/// Runs imprint extraction batches.
///
/// Holds only immutable collaborators, so one extractor can serve concurrent
/// batches (e.g. behind the HTTP endpoint).
///
/// # Example
///
/// ```no_run
/// use imprint_reader::{BatchRequest, Config, ImprintExtractor};
///
/// # async fn example() -> anyhow::Result<()> {
/// let extractor = ImprintExtractor::new(Config::default())?;
/// let batch = extractor
///     .process_batch(BatchRequest {
///         urls: vec!["example.de".to_string()],
///     })
///     .await?;
/// println!("{} of {} succeeded", batch.successful_extractions, batch.total_urls);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ImprintExtractor {
    fetcher: Arc<dyn PageFetcher>,
    model: Arc<dyn LanguageModel>,
    sink: Option<Arc<dyn ResultSink>>,
    config: Config,
}

impl ImprintExtractor {
    /// Builds an extractor with the HTTP fetcher and the Gemini client.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP clients cannot be built or `GEMINI_API_KEY` is unset.
    pub fn new(config: Config) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config).context("Failed to initialize HTTP fetcher")?;
        let model = GeminiClient::from_env()
            .context("Failed to initialize language model client")?
            .with_model(config.model.clone());
        Ok(Self::from_parts(Arc::new(fetcher), Arc::new(model), config))
    }

    /// Builds an extractor from explicit collaborators.
    pub fn from_parts(
        fetcher: Arc<dyn PageFetcher>,
        model: Arc<dyn LanguageModel>,
        config: Config,
    ) -> Self {
        Self {
            fetcher,
            model,
            sink: None,
            config,
        }
    }

    /// Persists every completed batch to `sink`.
    pub fn with_sink(mut self, sink: Arc<dyn ResultSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Processes a batch of URLs.
    ///
    /// Returns exactly one result per input URL, in input order, with
    /// `successful_extractions + failed_extractions == total_urls`. When the
    /// batch deadline passes, unfinished URLs are recorded as
    /// `"Batch timeout"` failures and the partial batch is returned.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for an empty request or one with more than
    /// `MAX_BATCH_SIZE` URLs; no URL is processed in that case.
    pub async fn process_batch(
        &self,
        request: BatchRequest,
    ) -> Result<BatchResult, ValidationError> {
        let urls = validate_request(request)?;
        let total_urls = urls.len();
        let start_time = Instant::now();
        info!(
            "Processing batch of {} URLs (concurrency {})",
            total_urls, self.config.max_concurrency
        );

        let stats = Arc::new(ProcessingStats::new());
        let ctx = Arc::new(self.processing_context(Arc::clone(&stats)));
        let semaphore = init_semaphore(self.config.max_concurrency);
        let cancel = CancellationToken::new();

        let mut abort_handles = Vec::with_capacity(total_urls);
        let mut tasks = FuturesUnordered::new();
        for (index, url) in urls.iter().enumerate() {
            let handle = tokio::spawn(process_url_task(UrlTaskParams {
                url: url.clone(),
                ctx: Arc::clone(&ctx),
                semaphore: Arc::clone(&semaphore),
                url_timeout: self.config.url_timeout,
                cancel: cancel.child_token(),
            }));
            abort_handles.push(handle.abort_handle());
            tasks.push(async move { (index, handle.await) });
        }

        let mut slots: Vec<Option<ImprintResult>> = (0..total_urls).map(|_| None).collect();
        let completed_urls = Arc::new(AtomicUsize::new(0));
        let deadline = tokio::time::sleep(self.config.batch_timeout);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                next = tasks.next() => {
                    let Some((index, joined)) = next else {
                        break;
                    };
                    slots[index] = Some(match joined {
                        Ok(result) => result,
                        Err(join_error) => panic_failure(&urls[index], join_error, &stats),
                    });
                    let completed = completed_urls.fetch_add(1, Ordering::SeqCst) + 1;
                    if completed % PROGRESS_LOG_EVERY == 0 {
                        log_progress(start_time, &completed_urls, total_urls);
                    }
                }
                _ = &mut deadline => {
                    warn!(
                        "Batch timeout after {}s with {} of {} URLs unfinished",
                        self.config.batch_timeout.as_secs(),
                        total_urls - completed_urls.load(Ordering::SeqCst),
                        total_urls
                    );
                    cancel.cancel();
                    for handle in &abort_handles {
                        handle.abort();
                    }
                    break;
                }
            }
        }

        let results: Vec<ImprintResult> = slots
            .into_iter()
            .zip(&urls)
            .map(|(slot, url)| {
                slot.unwrap_or_else(|| {
                    let error = PipelineError::BatchTimeout;
                    stats.increment_error(error.error_type());
                    ImprintResult::failure(url.as_str(), &error)
                })
            })
            .collect();

        log_progress(start_time, &completed_urls, total_urls);
        let batch = BatchResult::from_results(results, start_time.elapsed().as_secs_f64());
        print_batch_summary(&batch);
        print_error_statistics(&stats);

        if let Some(sink) = &self.sink {
            let sink = Arc::clone(sink);
            let snapshot = batch.clone();
            match tokio::task::spawn_blocking(move || sink.persist(&snapshot)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("Failed to persist batch results: {:#}", e),
                Err(e) => warn!("Persistence task failed: {}", e),
            }
        }
        Ok(batch)
    }

    fn processing_context(&self, stats: Arc<ProcessingStats>) -> ProcessingContext {
        let locator = ImprintLocator::new(
            Arc::clone(&self.fetcher),
            Arc::clone(&self.model),
            Arc::clone(&stats),
        )
        .with_max_hub_hops(self.config.max_hub_hops);
        ProcessingContext {
            fetcher: Arc::clone(&self.fetcher),
            locator,
            extractor: FieldExtractor::new(Arc::clone(&self.model)),
            stats,
            max_content_chars: self.config.max_content_chars,
        }
    }
}

/// Checks the request shape before any URL is processed.
fn validate_request(request: BatchRequest) -> Result<Vec<String>, ValidationError> {
    match request.urls.len() {
        0 => Err(ValidationError::Empty),
        count if count > MAX_BATCH_SIZE => Err(ValidationError::TooMany {
            count,
            max: MAX_BATCH_SIZE,
        }),
        _ => Ok(request.urls),
    }
}

/// Records a panicked or aborted task as a failed result.
fn panic_failure(url: &str, join_error: JoinError, stats: &ProcessingStats) -> ImprintResult {
    let message = if join_error.is_panic() {
        let payload = join_error.into_panic();
        payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "task panicked".to_string())
    } else {
        "task cancelled".to_string()
    };
    warn!("Task for {url} failed: {message}");

    let error = PipelineError::Exception(message);
    stats.increment_error(error.error_type());
    ImprintResult::failure(url, &error)
}
