//! The per-URL pipeline: fetch, locate, normalize, extract.

use std::sync::Arc;

use log::{info, warn};

use crate::app::validate_and_normalize_url;
use crate::error_handling::{InfoType, PipelineError, ProcessingStats, WarningType};
use crate::extract::FieldExtractor;
use crate::fetch::PageFetcher;
use crate::locate::ImprintLocator;
use crate::models::ImprintResult;
use crate::parse::normalize;

/// Collaborators shared by every URL task of a batch.
pub(crate) struct ProcessingContext {
    pub fetcher: Arc<dyn PageFetcher>,
    pub locator: ImprintLocator,
    pub extractor: FieldExtractor,
    pub stats: Arc<ProcessingStats>,
    pub max_content_chars: usize,
}

/// Runs the pipeline for one input and always yields a result record.
pub(crate) async fn process_url(raw_url: &str, ctx: &ProcessingContext) -> ImprintResult {
    match run_pipeline(raw_url, ctx).await {
        Ok(result) => result,
        Err(e) => {
            warn!("Failed to extract imprint for {raw_url}: {e}");
            ctx.stats.increment_error(e.error_type());
            ImprintResult::failure(raw_url, &e)
        }
    }
}

async fn run_pipeline(
    raw_url: &str,
    ctx: &ProcessingContext,
) -> Result<ImprintResult, PipelineError> {
    let url = validate_and_normalize_url(raw_url)?;

    let homepage = ctx
        .fetcher
        .fetch(&url)
        .await
        .map_err(PipelineError::Homepage)?;
    if homepage.attempts > 1 {
        ctx.stats.increment_info(InfoType::FetchRetried);
    }

    let located = ctx
        .locator
        .locate(&homepage)
        .await
        .ok_or(PipelineError::NoImprintFound)?;

    let text = normalize(&located.page.content, ctx.max_content_chars);
    let fields = ctx.extractor.extract_fields(&text).await?;
    if fields.is_empty() {
        ctx.stats.increment_warning(WarningType::EmptyExtraction);
    }

    let insecure_tls = homepage.insecure_tls || located.page.insecure_tls;
    if insecure_tls {
        ctx.stats.increment_warning(WarningType::InsecureTlsFallback);
        warn!(
            "Extracted imprint for {raw_url} from {} without certificate verification",
            located.url
        );
    } else {
        info!("Extracted imprint for {raw_url} from {}", located.url);
    }

    Ok(ImprintResult::success(raw_url, located.url, fields).with_insecure_tls(insecure_tls))
}
