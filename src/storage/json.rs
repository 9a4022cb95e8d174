//! JSON snapshot and rolling log sink.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chrono::Local;
use log::info;
use serde::{Deserialize, Serialize};

use super::ResultSink;
use crate::config::ROLLING_LOG_CAPACITY;
use crate::models::{BatchResult, ImprintResult};

/// File name of the rolling extraction log.
pub const ROLLING_LOG_FILE_NAME: &str = "extraction_log.json";

#[derive(Serialize)]
struct Snapshot<'a> {
    timestamp: String,
    #[serde(flatten)]
    batch: &'a BatchResult,
}

#[derive(Serialize, Deserialize, Default)]
struct RollingLog {
    #[serde(default)]
    extractions: Vec<ImprintResult>,
}

/// Writes each batch to `<dir>/batch_<timestamp>.json` and appends its
/// results to `<dir>/extraction_log.json`, which keeps the most recent
/// `ROLLING_LOG_CAPACITY` results.
///
/// Clones share one write lock, so concurrent batches never interleave their
/// read-modify-write of the rolling log.
#[derive(Debug, Clone)]
pub struct JsonSnapshotSink {
    dir: PathBuf,
    capacity: usize,
    write_lock: Arc<Mutex<()>>,
}

impl JsonSnapshotSink {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            capacity: ROLLING_LOG_CAPACITY,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Overrides how many results the rolling log keeps.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    fn write_snapshot(&self, batch: &BatchResult) -> Result<PathBuf> {
        let now = Local::now();
        let path = self.free_snapshot_path(&now.format("%Y%m%d_%H%M%S_%3f").to_string());
        let snapshot = Snapshot {
            timestamp: now.format("%Y-%m-%d %H:%M:%S").to_string(),
            batch,
        };
        let json = serde_json::to_string_pretty(&snapshot).context("Failed to serialize batch")?;
        fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// `batch_<stamp>.json`, or `batch_<stamp>_<n>.json` when two batches
    /// finish within the same millisecond.
    fn free_snapshot_path(&self, stamp: &str) -> PathBuf {
        let path = self.dir.join(format!("batch_{stamp}.json"));
        if !path.exists() {
            return path;
        }
        (1..)
            .map(|n| self.dir.join(format!("batch_{stamp}_{n}.json")))
            .find(|p| !p.exists())
            .unwrap_or(path)
    }

    fn append_to_rolling_log(&self, batch: &BatchResult) -> Result<()> {
        let path = self.dir.join(ROLLING_LOG_FILE_NAME);
        let mut log: RollingLog = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => RollingLog::default(),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };

        log.extractions.extend(batch.results.iter().cloned());
        let excess = log.extractions.len().saturating_sub(self.capacity);
        log.extractions.drain(..excess);

        let json = serde_json::to_string_pretty(&log).context("Failed to serialize rolling log")?;
        fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))
    }
}

impl ResultSink for JsonSnapshotSink {
    fn name(&self) -> &'static str {
        "json"
    }

    fn persist(&self, batch: &BatchResult) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create directory {}", self.dir.display()))?;
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let snapshot = self.write_snapshot(batch)?;
        self.append_to_rolling_log(batch)?;
        info!("Saved batch snapshot to {}", snapshot.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::PipelineError;

    fn batch_of(n: usize) -> BatchResult {
        let results = (0..n)
            .map(|i| ImprintResult::failure(format!("site{i}.de"), &PipelineError::Timeout))
            .collect();
        BatchResult::from_results(results, 1.0)
    }

    #[test]
    fn test_snapshot_contains_batch() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonSnapshotSink::new(dir.path());
        sink.persist(&batch_of(2)).unwrap();

        let snapshot = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .find(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("batch_"))
            })
            .unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(snapshot).unwrap()).unwrap();
        assert_eq!(value["total_urls"], 2);
        assert_eq!(value["failed_extractions"], 2);
        assert!(value["timestamp"].is_string());
        assert_eq!(value["results"][1]["original_url"], "site1.de");
    }

    #[test]
    fn test_rolling_log_keeps_most_recent() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonSnapshotSink::new(dir.path()).with_capacity(3);
        sink.persist(&batch_of(2)).unwrap();
        sink.persist(&batch_of(2)).unwrap();

        let log: RollingLog = serde_json::from_str(
            &fs::read_to_string(dir.path().join(ROLLING_LOG_FILE_NAME)).unwrap(),
        )
        .unwrap();
        let urls: Vec<&str> = log
            .extractions
            .iter()
            .map(|r| r.original_url.as_str())
            .collect();
        assert_eq!(urls, ["site1.de", "site0.de", "site1.de"]);
    }

    #[test]
    fn test_concurrent_persists_keep_every_result() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonSnapshotSink::new(dir.path()).with_capacity(1000);

        std::thread::scope(|scope| {
            for _ in 0..8 {
                let sink = sink.clone();
                scope.spawn(move || {
                    for _ in 0..10 {
                        sink.persist(&batch_of(5)).unwrap();
                    }
                });
            }
        });

        let log: RollingLog = serde_json::from_str(
            &fs::read_to_string(dir.path().join(ROLLING_LOG_FILE_NAME)).unwrap(),
        )
        .unwrap();
        assert_eq!(log.extractions.len(), 400);

        let snapshots = fs::read_dir(dir.path())
            .unwrap()
            .filter(|e| {
                e.as_ref()
                    .unwrap()
                    .file_name()
                    .to_string_lossy()
                    .starts_with("batch_")
            })
            .count();
        assert_eq!(snapshots, 80);
    }
}
