//! Result persistence.
//!
//! Completed batches are handed to a `ResultSink` once, after aggregation.
//! Sinks never influence the returned `BatchResult`: a failing sink is logged
//! and the batch result is still delivered.
//!
//! Available sinks:
//! - `CsvSink`: appends one row per result to `imprint_extractions.csv`
//! - `JsonSnapshotSink`: writes `batch_<timestamp>.json` and keeps a rolling
//!   `extraction_log.json`

mod csv;
mod json;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use log::warn;

use crate::models::BatchResult;

pub use self::csv::{CsvSink, CSV_FILE_NAME};
pub use self::json::{JsonSnapshotSink, ROLLING_LOG_FILE_NAME};

/// Destination for completed batches.
pub trait ResultSink: Send + Sync {
    /// Short name used in log messages.
    fn name(&self) -> &'static str;

    /// Stores one completed batch.
    fn persist(&self, batch: &BatchResult) -> Result<()>;
}

/// Fans a batch out to several sinks.
///
/// Each sink is called in order; a failure is logged and does not stop the
/// remaining sinks.
#[derive(Default, Clone)]
pub struct CompositeSink {
    sinks: Vec<Arc<dyn ResultSink>>,
}

impl CompositeSink {
    pub fn new(sinks: Vec<Arc<dyn ResultSink>>) -> Self {
        Self { sinks }
    }

    /// CSV and JSON sinks writing into `dir`.
    pub fn in_directory(dir: &Path) -> Self {
        Self::new(vec![
            Arc::new(CsvSink::new(dir)),
            Arc::new(JsonSnapshotSink::new(dir)),
        ])
    }
}

impl ResultSink for CompositeSink {
    fn name(&self) -> &'static str {
        "composite"
    }

    fn persist(&self, batch: &BatchResult) -> Result<()> {
        for sink in &self.sinks {
            if let Err(e) = sink.persist(batch) {
                warn!("Failed to persist batch to {} sink: {:#}", sink.name(), e);
            }
        }
        Ok(())
    }
}
