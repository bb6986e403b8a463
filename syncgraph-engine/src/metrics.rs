//! Metrics Recorder (§2, §5): counters, gauges, and a running mean,
//! updated synchronously at each pipeline step. One mutex guards the
//! counters; snapshots are read under the same lock and then released
//! immediately, matching the shared-state discipline in §5.

use std::sync::Mutex;
use std::time::{Duration, SystemTime};

use syncgraph_core::types::BatchMetrics;

#[derive(Debug, Clone)]
pub struct EngineStats {
    pub files_monitored: usize,
    pub files_processed: u64,
    pub changes_detected: u64,
    pub errors: u64,
    pub last_change: Option<SystemTime>,
    pub average_processing_time_ms: f64,
    pub batch_metrics: Option<BatchMetrics>,
    pub cache_size: Option<usize>,
}

#[derive(Default)]
struct Counters {
    files_monitored: usize,
    files_processed: u64,
    changes_detected: u64,
    errors: u64,
    last_change: Option<SystemTime>,
    cumulative_processing_time_ms: u64,
}

pub struct MetricsRecorder {
    counters: Mutex<Counters>,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            counters: Mutex::new(Counters::default()),
        }
    }

    pub fn record_processed(&self, duration: Duration) {
        let mut c = self.counters.lock().expect("metrics lock poisoned");
        c.files_processed += 1;
        c.cumulative_processing_time_ms += duration.as_millis() as u64;
        c.last_change = Some(SystemTime::now());
    }

    pub fn record_change_detected(&self) {
        self.counters
            .lock()
            .expect("metrics lock poisoned")
            .changes_detected += 1;
    }

    pub fn record_error(&self) {
        self.counters.lock().expect("metrics lock poisoned").errors += 1;
    }

    pub fn set_files_monitored(&self, count: usize) {
        self.counters.lock().expect("metrics lock poisoned").files_monitored = count;
    }

    pub fn snapshot(&self, batch_metrics: Option<BatchMetrics>, cache_size: Option<usize>) -> EngineStats {
        let c = self.counters.lock().expect("metrics lock poisoned");
        let average_processing_time_ms = if c.files_processed > 0 {
            c.cumulative_processing_time_ms as f64 / c.files_processed as f64
        } else {
            0.0
        };
        EngineStats {
            files_monitored: c.files_monitored,
            files_processed: c.files_processed,
            changes_detected: c.changes_detected,
            errors: c.errors,
            last_change: c.last_change,
            average_processing_time_ms,
            batch_metrics,
            cache_size,
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
