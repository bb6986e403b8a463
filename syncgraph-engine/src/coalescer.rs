//! Batch Coalescer (§4.3). Accepts per-path change events, keeps the
//! latest event per path, flushes by size or interval, retries failed
//! batches up to a bound.
//!
//! Grounded on the teacher's dedicated-thread batch writer
//! (`drift-storage::batch::writer::BatchWriter`): a named thread owns the
//! buffer and runs a `select!`/`recv_timeout`-style loop, flushing happens
//! outside any lock, and a failed flush leaves its contents available for
//! retry rather than being dropped. The two designs differ in what they
//! buffer — the writer batches arbitrary SQL rows in arrival order; the
//! coalescer keeps one map slot per path so a path's in-flight event is
//! always its latest — but the thread/channel/flush-on-timeout-or-trigger
//! shape is the same idiom.

use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, select, Sender};
use rustc_hash::FxHashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use syncgraph_core::types::{BatchMetrics, ChangeEvent};

/// User-supplied batch processor. Captured at construction rather than
/// called back cyclically, resolving the engine/coalescer cyclic
/// reference flagged in the design notes.
pub type ProcessFn = dyn Fn(Vec<ChangeEvent>) -> Result<(), String> + Send + Sync;

struct Shared {
    pending: Mutex<FxHashMap<PathBuf, ChangeEvent>>,
    metrics: Mutex<BatchMetrics>,
}

pub struct BatchCoalescer {
    shared: Arc<Shared>,
    trigger_tx: Sender<()>,
    cancel_tx: Sender<()>,
    handle: Option<JoinHandle<()>>,
    size_threshold: usize,
}

impl BatchCoalescer {
    pub fn start(
        size_threshold: usize,
        flush_interval: Duration,
        retry_bound: u32,
        process: Arc<ProcessFn>,
    ) -> Self {
        let shared = Arc::new(Shared {
            pending: Mutex::new(FxHashMap::default()),
            metrics: Mutex::new(BatchMetrics::default()),
        });
        let (trigger_tx, trigger_rx) = bounded::<()>(1);
        let (cancel_tx, cancel_rx) = bounded::<()>(1);

        let loop_shared = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name("syncgraph-coalescer".to_string())
            .spawn(move || {
                let ticker = crossbeam_channel::tick(flush_interval);
                let mut last_flush = Instant::now();

                loop {
                    select! {
                        recv(ticker) -> _ => {
                            if last_flush.elapsed() >= flush_interval {
                                flush(&loop_shared, &process, retry_bound);
                                last_flush = Instant::now();
                            }
                        }
                        recv(trigger_rx) -> _ => {
                            flush(&loop_shared, &process, retry_bound);
                            last_flush = Instant::now();
                        }
                        recv(cancel_rx) -> _ => {
                            flush(&loop_shared, &process, retry_bound);
                            break;
                        }
                    }
                }
            })
            .expect("failed to spawn coalescer thread");

        Self {
            shared,
            trigger_tx,
            cancel_tx,
            handle: Some(handle),
            size_threshold,
        }
    }

    /// Stores/overwrites `pending[event.path]`. If the pending set reaches
    /// the size threshold, signals the trigger channel (non-blocking).
    pub fn add(&self, event: ChangeEvent) {
        let should_trigger = {
            let mut pending = self.shared.pending.lock().expect("coalescer lock poisoned");
            pending.insert(event.path.clone(), event);
            pending.len() >= self.size_threshold
        };
        if should_trigger {
            let _ = self.trigger_tx.try_send(());
        }
    }

    pub fn pending_count(&self) -> usize {
        self.shared.pending.lock().expect("coalescer lock poisoned").len()
    }

    pub fn metrics(&self) -> BatchMetrics {
        self.shared.metrics.lock().expect("coalescer lock poisoned").clone()
    }

    /// One final flush, then joins the background thread.
    pub fn stop(mut self) {
        let _ = self.cancel_tx.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn flush(shared: &Arc<Shared>, process: &Arc<ProcessFn>, retry_bound: u32) {
    let batch: Vec<ChangeEvent> = {
        let mut pending = shared.pending.lock().expect("coalescer lock poisoned");
        if pending.is_empty() {
            return;
        }
        pending.drain().map(|(_, event)| event).collect()
    };

    let batch_size = batch.len();
    let started = Instant::now();
    let result = process(batch.clone());
    let duration_ms = started.elapsed().as_millis() as u64;
    let errored = result.is_err();

    if let Err(message) = result {
        tracing::warn!(batch_size, error = %message, "batch processing failed, scheduling retry");
        let mut pending = shared.pending.lock().expect("coalescer lock poisoned");
        for mut event in batch {
            event.retries += 1;
            if event.retries < retry_bound {
                pending.entry(event.path.clone()).or_insert(event);
            } else {
                tracing::warn!(path = %event.path.display(), "dropping path after exhausting retries");
            }
        }
    }

    shared
        .metrics
        .lock()
        .expect("coalescer lock poisoned")
        .record_flush(batch_size, duration_ms, errored);
}
