//! CSV append sink.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use csv::WriterBuilder;
use log::info;

use super::ResultSink;
use crate::models::{BatchResult, ImprintResult};

/// File name of the appended CSV table.
pub const CSV_FILE_NAME: &str = "imprint_extractions.csv";

/// Appends one row per result to `<dir>/imprint_extractions.csv`.
///
/// The header row is written only when the file is created (or empty).
/// Clones share one write lock, so rows of concurrent batches never interleave.
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl CsvSink {
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(CSV_FILE_NAME),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultSink for CsvSink {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn persist(&self, batch: &BatchResult) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory {}", dir.display()))?;
        }
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let needs_header = fs::metadata(&self.path).map_or(true, |m| m.len() == 0);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

        if needs_header {
            writer
                .write_record(ImprintResult::CSV_HEADERS)
                .context("Failed to write CSV header")?;
        }
        for result in &batch.results {
            writer
                .write_record(result.csv_record())
                .with_context(|| format!("Failed to write CSV row for {}", result.original_url))?;
        }
        writer.flush().context("Failed to flush CSV file")?;

        info!(
            "Appended {} rows to {}",
            batch.results.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::PipelineError;
    use crate::models::ImprintFields;

    fn batch() -> BatchResult {
        let fields = ImprintFields {
            company_name: "Example GmbH".to_string(),
            managing_directors: "Jane Doe; John Roe".to_string(),
            ..Default::default()
        };
        BatchResult::from_results(
            vec![
                ImprintResult::success("a.de", "https://a.de/impressum", fields),
                ImprintResult::failure("b.de", &PipelineError::NoImprintFound),
            ],
            2.0,
        )
    }

    #[test]
    fn test_header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let sink = CsvSink::new(&dir.path().join("results"));

        sink.persist(&batch()).unwrap();
        sink.persist(&batch()).unwrap();

        let mut reader = csv::Reader::from_path(sink.path()).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.len(), ImprintResult::CSV_HEADERS.len());
        assert_eq!(&headers[0], "timestamp");

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 4);
        assert_eq!(&rows[0][1], "a.de");
        assert_eq!(&rows[0][5], "Example GmbH");
        assert_eq!(&rows[0][6], "Jane Doe; John Roe");
        assert_eq!(&rows[0][16], "true");
        assert_eq!(&rows[1][2], "");
        assert_eq!(&rows[1][17], "No imprint page found");
    }

    #[test]
    fn test_concurrent_persists_write_whole_rows() {
        let dir = tempfile::tempdir().unwrap();
        let sink = CsvSink::new(dir.path());
        let failures: Vec<ImprintResult> = (0..5)
            .map(|i| ImprintResult::failure(format!("site{i}.de"), &PipelineError::Timeout))
            .collect();
        let batch = BatchResult::from_results(failures, 1.0);

        std::thread::scope(|scope| {
            for _ in 0..8 {
                let sink = sink.clone();
                let batch = &batch;
                scope.spawn(move || {
                    for _ in 0..10 {
                        sink.persist(batch).unwrap();
                    }
                });
            }
        });

        let content = fs::read_to_string(sink.path()).unwrap();
        let header_lines = content.lines().filter(|l| l.starts_with("timestamp,")).count();
        assert_eq!(header_lines, 1);

        let mut reader = csv::Reader::from_path(sink.path()).unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 400);
        assert!(rows
            .iter()
            .all(|row| row.len() == ImprintResult::CSV_HEADERS.len()));
    }
}
