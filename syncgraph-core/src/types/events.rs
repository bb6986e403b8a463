//! Change events flowing from the watcher/scanner into the engine, and the
//! batch-level metrics the coalescer updates on every flush.

use std::path::PathBuf;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    Create,
    Modify,
    Remove,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
    pub timestamp: SystemTime,
    pub retries: u32,
}

impl ChangeEvent {
    pub fn new(path: PathBuf, kind: ChangeKind) -> Self {
        Self {
            path,
            kind,
            timestamp: SystemTime::now(),
            retries: 0,
        }
    }
}

/// Monotonic counters and a running mean the coalescer updates on every
/// flush. Cumulative, never reset while the engine runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchMetrics {
    pub total_batches: u64,
    pub total_changes: u64,
    pub errors: u64,
    mean_batch_size: f64,
    pub cumulative_processing_time_ms: u64,
}

impl BatchMetrics {
    pub fn record_flush(&mut self, batch_size: usize, duration_ms: u64, errored: bool) {
        self.total_batches += 1;
        self.total_changes += batch_size as u64;
        self.cumulative_processing_time_ms += duration_ms;
        if errored {
            self.errors += 1;
        }
        // Incremental mean update, avoids resumming the full history.
        let n = self.total_batches as f64;
        self.mean_batch_size += (batch_size as f64 - self.mean_batch_size) / n;
    }

    pub fn mean_batch_size(&self) -> f64 {
        self.mean_batch_size
    }
}
