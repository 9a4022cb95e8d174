//! Error handling and processing statistics.
//!
//! This module provides:
//! - Typed errors for every pipeline stage
//! - Processing statistics tracking (errors, warnings, info metrics)
//! - Retry strategy configuration
//! - Transport error categorization
//!
//! Statistics are categorized into:
//! - **Errors**: Failures that produce a failed result
//! - **Warnings**: Degraded but successful outcomes (insecure TLS, empty extraction)
//! - **Info**: Which locator strategy found the imprint, retries

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::{
    categorize_reqwest_error, get_retry_strategy, is_retriable_fetch_error, is_tls_error,
};
pub use stats::ProcessingStats;
pub use types::{
    ErrorType, ExtractionError, FetchError, InfoType, InitializationError, LlmError,
    PipelineError, ValidationError, WarningType,
};

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_processing_stats_initialization() {
        let stats = ProcessingStats::new();
        for error_type in ErrorType::iter() {
            assert_eq!(stats.get_error_count(error_type), 0);
        }
        for warning_type in WarningType::iter() {
            assert_eq!(stats.get_warning_count(warning_type), 0);
        }
        for info_type in InfoType::iter() {
            assert_eq!(stats.get_info_count(info_type), 0);
        }
    }

    #[test]
    fn test_processing_stats_increment() {
        let stats = ProcessingStats::new();
        stats.increment_error(ErrorType::NoImprintFound);
        assert_eq!(stats.get_error_count(ErrorType::NoImprintFound), 1);

        stats.increment_warning(WarningType::InsecureTlsFallback);
        assert_eq!(stats.get_warning_count(WarningType::InsecureTlsFallback), 1);

        stats.increment_info(InfoType::HubHop);
        assert_eq!(stats.get_info_count(InfoType::HubHop), 1);
    }

    #[test]
    fn test_processing_stats_totals() {
        let stats = ProcessingStats::new();
        stats.increment_error(ErrorType::ProcessUrlTimeout);
        stats.increment_error(ErrorType::ProcessUrlTimeout);
        stats.increment_error(ErrorType::FetchTimeout);
        stats.increment_warning(WarningType::EmptyExtraction);
        stats.increment_info(InfoType::KeywordMatch);

        assert_eq!(stats.get_error_count(ErrorType::ProcessUrlTimeout), 2);
        assert_eq!(stats.total_errors(), 3);
        assert_eq!(stats.total_warnings(), 1);
        assert_eq!(stats.total_info(), 1);
    }

    #[test]
    fn test_processing_stats_concurrent_increments() {
        let stats = std::sync::Arc::new(ProcessingStats::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let stats = std::sync::Arc::clone(&stats);
                std::thread::spawn(move || {
                    for _ in 0..250 {
                        stats.increment_error(ErrorType::NoImprintFound);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(stats.get_error_count(ErrorType::NoImprintFound), 1000);
    }
}
