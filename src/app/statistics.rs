//! Statistics printing.

use log::info;

use crate::error_handling::ProcessingStats;
use crate::models::BatchResult;

/// Prints a one-line summary of a finished batch.
pub fn print_batch_summary(batch: &BatchResult) {
    info!(
        "✅ Processed {} URL{} ({} succeeded, {} failed, {:.1}%) in {:.1}s",
        batch.total_urls,
        if batch.total_urls == 1 { "" } else { "s" },
        batch.successful_extractions,
        batch.failed_extractions,
        batch.success_rate_percent,
        batch.processing_time_seconds
    );
}

/// Logs the error, warning, and info counters of a batch, skipping empty groups.
pub fn print_error_statistics(stats: &ProcessingStats) {
    log_group(
        "Error",
        stats.total_errors(),
        stats.error_counts().into_iter().map(|(t, n)| (t.as_str(), n)),
    );
    log_group(
        "Warning",
        stats.total_warnings(),
        stats.warning_counts().into_iter().map(|(t, n)| (t.as_str(), n)),
    );
    log_group(
        "Info",
        stats.total_info(),
        stats.info_counts().into_iter().map(|(t, n)| (t.as_str(), n)),
    );
}

fn log_group(label: &str, total: usize, counts: impl Iterator<Item = (&'static str, usize)>) {
    if total == 0 {
        return;
    }
    info!("{label} Counts ({total} total):");
    for (name, count) in counts {
        info!("   {name}: {count}");
    }
}
