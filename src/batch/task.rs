//! Per-URL task processing.
//!
//! Each input URL runs as one spawned task that waits for a concurrency
//! permit, then runs the pipeline under the per-URL timeout. Both waits end
//! early when the batch is cancelled.

use std::sync::Arc;
use std::time::Duration;

use log::warn;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use super::pipeline::{process_url, ProcessingContext};
use crate::error_handling::PipelineError;
use crate::models::ImprintResult;

/// Parameters for processing a single URL task.
pub(crate) struct UrlTaskParams {
    /// The URL exactly as submitted
    pub url: String,
    /// Shared processing context
    pub ctx: Arc<ProcessingContext>,
    /// Pool limiting concurrently running pipelines
    pub semaphore: Arc<Semaphore>,
    /// Wall-clock budget for this URL's pipeline
    pub url_timeout: Duration,
    /// Cancelled when the batch deadline passes
    pub cancel: CancellationToken,
}

/// Process a single URL task.
///
/// Always yields a result: timeouts and batch cancellation become failed
/// records. Panics propagate to the `JoinHandle`, where the orchestrator
/// records them.
pub(crate) async fn process_url_task(params: UrlTaskParams) -> ImprintResult {
    let UrlTaskParams {
        url,
        ctx,
        semaphore,
        url_timeout,
        cancel,
    } = params;

    // Hold the permit until the task completes
    let _permit = tokio::select! {
        _ = cancel.cancelled() => {
            return ImprintResult::failure(url.as_str(), &PipelineError::BatchTimeout);
        }
        permit = semaphore.acquire_owned() => match permit {
            Ok(permit) => permit,
            Err(_) => {
                warn!("Semaphore closed, skipping URL: {url}");
                return ImprintResult::failure(url.as_str(), &PipelineError::BatchTimeout);
            }
        },
    };

    tokio::select! {
        _ = cancel.cancelled() => {
            ImprintResult::failure(url.as_str(), &PipelineError::BatchTimeout)
        }
        outcome = tokio::time::timeout(url_timeout, process_url(&url, &ctx)) => match outcome {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    "Timeout processing URL {} (after {}s)",
                    url,
                    url_timeout.as_secs_f64()
                );
                let error = PipelineError::Timeout;
                ctx.stats.increment_error(error.error_type());
                ImprintResult::failure(url.as_str(), &error)
            }
        },
    }
}
