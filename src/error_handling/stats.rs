//! Per-batch outcome counters.
//!
//! Every pipeline task shares one `ProcessingStats` behind an `Arc`. Counters
//! are allocated for every enum variant up front, so recording never locks
//! or allocates.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};

use strum::IntoEnumIterator;

use super::types::{ErrorType, InfoType, WarningType};

/// One atomic counter per variant of `K`.
struct CounterTable<K> {
    counters: HashMap<K, AtomicUsize>,
}

impl<K> CounterTable<K>
where
    K: IntoEnumIterator + Copy + Eq + Hash + std::fmt::Debug,
{
    fn new() -> Self {
        Self {
            counters: K::iter().map(|k| (k, AtomicUsize::new(0))).collect(),
        }
    }

    fn bump(&self, key: K) {
        match self.counters.get(&key) {
            Some(counter) => {
                counter.fetch_add(1, Ordering::Relaxed);
            }
            None => log::error!("No counter registered for {key:?}"),
        }
    }

    fn get(&self, key: K) -> usize {
        self.counters
            .get(&key)
            .map_or(0, |c| c.load(Ordering::SeqCst))
    }

    fn total(&self) -> usize {
        K::iter().map(|k| self.get(k)).sum()
    }

    /// Non-zero counts in variant declaration order.
    fn non_zero(&self) -> Vec<(K, usize)> {
        K::iter()
            .map(|k| (k, self.get(k)))
            .filter(|(_, n)| *n > 0)
            .collect()
    }
}

/// Error, warning, and info counts of one batch.
pub struct ProcessingStats {
    errors: CounterTable<ErrorType>,
    warnings: CounterTable<WarningType>,
    info: CounterTable<InfoType>,
}

impl Default for ProcessingStats {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self {
            errors: CounterTable::new(),
            warnings: CounterTable::new(),
            info: CounterTable::new(),
        }
    }

    /// Records a failed URL under its error category.
    pub fn increment_error(&self, error: ErrorType) {
        self.errors.bump(error);
    }

    /// Records a degraded but successful outcome.
    pub fn increment_warning(&self, warning: WarningType) {
        self.warnings.bump(warning);
    }

    /// Records which strategy or recovery path a URL went through.
    pub fn increment_info(&self, info_type: InfoType) {
        self.info.bump(info_type);
    }

    pub fn get_error_count(&self, error: ErrorType) -> usize {
        self.errors.get(error)
    }

    pub fn get_warning_count(&self, warning: WarningType) -> usize {
        self.warnings.get(warning)
    }

    pub fn get_info_count(&self, info_type: InfoType) -> usize {
        self.info.get(info_type)
    }

    pub fn total_errors(&self) -> usize {
        self.errors.total()
    }

    pub fn total_warnings(&self) -> usize {
        self.warnings.total()
    }

    pub fn total_info(&self) -> usize {
        self.info.total()
    }

    /// Error categories that occurred, with their counts.
    pub fn error_counts(&self) -> Vec<(ErrorType, usize)> {
        self.errors.non_zero()
    }

    /// Warning categories that occurred, with their counts.
    pub fn warning_counts(&self) -> Vec<(WarningType, usize)> {
        self.warnings.non_zero()
    }

    /// Info categories that occurred, with their counts.
    pub fn info_counts(&self) -> Vec<(InfoType, usize)> {
        self.info.non_zero()
    }
}
