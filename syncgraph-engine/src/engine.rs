//! Sync Engine (§4.7): orchestrates the Content Tracker, Differ, Batch
//! Coalescer, Revision-Control Scanner, Filesystem Watcher, and Metrics
//! Recorder into the one event-processing pipeline, and owns their
//! lifecycle handles.
//!
//! Grounded on the teacher's `Scanner::scan` orchestration (phase timing
//! via `Instant`, progress events, non-fatal per-file errors logged and
//! skipped) generalized from a one-shot scan into a long-lived,
//! pausable/resumable engine with background watcher/scanner/coalescer
//! tasks.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant, SystemTime};

use syncgraph_core::errors::SyncError;
use syncgraph_core::traits::{EmbeddingSink, GraphSink, NoOpEmbeddingSink, SourceParser};
use syncgraph_core::types::{ChangeKind, ChangeStatus, EntityDelta, Language, ParsedFile};
use syncgraph_core::EngineConfig;

use crate::coalescer::{BatchCoalescer, ProcessFn};
use crate::control::{ControlEvent, ControlEventKind, EventSubscriber};
use crate::diff::Differ;
use crate::metrics::{EngineStats, MetricsRecorder};
use crate::tracker::ContentTracker;
use crate::vcs::{filter_supported, RevisionControlScanner, VcsStatus};
use crate::watcher::FsWatcher;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Constructed,
    Running,
    Paused,
    Stopped,
}

struct BackgroundTasks {
    watcher: Option<FsWatcher>,
    coalescer: Option<BatchCoalescer>,
    scanner_handle: Option<JoinHandle<()>>,
    periodic_save_handle: Option<JoinHandle<()>>,
    metrics_handle: Option<JoinHandle<()>>,
}

pub struct SyncEngine {
    config: EngineConfig,
    parser: Arc<dyn SourceParser>,
    sink: Arc<dyn GraphSink>,
    embedding_sink: Arc<dyn EmbeddingSink>,
    tracker: Arc<ContentTracker>,
    differ: Arc<Differ>,
    metrics: Arc<MetricsRecorder>,
    subscriber: RwLock<Option<Arc<EventSubscriber>>>,
    state: RwLock<EngineState>,
    start_time: RwLock<Option<SystemTime>>,
    background_cancel: Arc<AtomicBool>,
    tasks: Mutex<BackgroundTasks>,
}

impl SyncEngine {
    pub fn new(config: EngineConfig, parser: Arc<dyn SourceParser>, sink: Arc<dyn GraphSink>) -> Arc<Self> {
        Self::with_embedding_sink(config, parser, sink, Arc::new(NoOpEmbeddingSink))
    }

    pub fn with_embedding_sink(
        config: EngineConfig,
        parser: Arc<dyn SourceParser>,
        sink: Arc<dyn GraphSink>,
        embedding_sink: Arc<dyn EmbeddingSink>,
    ) -> Arc<Self> {
        let root = config
            .effective_root()
            .cloned()
            .unwrap_or_else(|| PathBuf::from("."));

        Arc::new(Self {
            tracker: Arc::new(ContentTracker::new(&root, syncgraph_core::constants::STATE_FILE_NAME)),
            differ: Arc::new(Differ::new()),
            metrics: Arc::new(MetricsRecorder::new()),
            subscriber: RwLock::new(None),
            state: RwLock::new(EngineState::Constructed),
            start_time: RwLock::new(None),
            background_cancel: Arc::new(AtomicBool::new(false)),
            tasks: Mutex::new(BackgroundTasks {
                watcher: None,
                coalescer: None,
                scanner_handle: None,
                periodic_save_handle: None,
                metrics_handle: None,
            }),
            config,
            parser,
            sink,
            embedding_sink,
        })
    }

    pub fn set_event_subscriber(&self, subscriber: Arc<EventSubscriber>) {
        *self.subscriber.write().expect("subscriber lock poisoned") = Some(subscriber);
    }

    fn publish(&self, event: ControlEvent) {
        if let Some(sub) = self.subscriber.read().expect("subscriber lock poisoned").as_ref() {
            sub(event);
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(
            *self.state.read().expect("state lock poisoned"),
            EngineState::Running | EngineState::Paused
        )
    }

    pub fn is_paused(&self) -> bool {
        *self.state.read().expect("state lock poisoned") == EngineState::Paused
    }

    pub fn start_time(&self) -> Option<SystemTime> {
        *self.start_time.read().expect("start_time lock poisoned")
    }

    pub fn list_monitored(&self) -> Vec<PathBuf> {
        self.tracker.tracked_paths()
    }

    pub fn stats(&self) -> EngineStats {
        let (batch_metrics, cache_size) = {
            let tasks = self.tasks.lock().expect("tasks lock poisoned");
            let batch = tasks.coalescer.as_ref().map(|c| c.metrics());
            (batch, Some(self.differ.size()))
        };
        self.metrics.snapshot(batch_metrics, cache_size)
    }

    pub fn pause(&self) {
        let mut state = self.state.write().expect("state lock poisoned");
        if *state == EngineState::Running {
            *state = EngineState::Paused;
        }
    }

    pub fn resume(&self) {
        let mut state = self.state.write().expect("state lock poisoned");
        if *state == EngineState::Paused {
            *state = EngineState::Running;
        }
    }

    /// Starts every background task: loads fingerprint state, starts the
    /// watcher, optionally the coalescer and revision-control scanner,
    /// and the periodic-save and metrics-updater tickers.
    pub fn start(self: &Arc<Self>) -> Result<(), SyncError> {
        let root = self
            .config
            .effective_root()
            .cloned()
            .ok_or_else(|| SyncError::Config("root path is required".to_string()))?;

        self.tracker.load_from_disk();
        self.sink
            .create_indexes()
            .map_err(|e| SyncError::Config(e.to_string()))?;

        {
            let mut state = self.state.write().expect("state lock poisoned");
            *state = EngineState::Running;
        }
        *self.start_time.write().expect("start_time lock poisoned") = Some(SystemTime::now());
        self.background_cancel.store(false, Ordering::SeqCst);

        let mut tasks = self.tasks.lock().expect("tasks lock poisoned");

        if self.config.effective_enable_batching() {
            let engine = Arc::clone(self);
            let process: Arc<ProcessFn> = Arc::new(move |batch| {
                let mut any_error = false;
                for event in batch {
                    if engine.process_event(event.path, event.kind).is_err() {
                        any_error = true;
                    }
                }
                if any_error {
                    Err("one or more events in the batch failed".to_string())
                } else {
                    Ok(())
                }
            });
            tasks.coalescer = Some(BatchCoalescer::start(
                self.config.effective_batch_size(),
                Duration::from_secs(self.config.effective_batch_flush_interval_secs()),
                self.config.effective_batch_retry_bound(),
                process,
            ));
        }

        let engine_for_watcher = Arc::clone(self);
        let handler: Arc<crate::watcher::EventHandler> = Arc::new(move |event| {
            engine_for_watcher.dispatch_raw_event(event.path, event.kind);
        });
        tasks.watcher = Some(FsWatcher::start(&root, handler));

        if self.config.effective_enable_revision_control() {
            tasks.scanner_handle = Some(self.spawn_scanner(root.clone()));
        }

        tasks.periodic_save_handle = Some(self.spawn_periodic_save());
        tasks.metrics_handle = Some(self.spawn_metrics_updater(root.clone()));

        Ok(())
    }

    /// Cancels every background task, performs one final coalescer flush
    /// and one final fingerprint save, closes both sinks, and waits for
    /// every task to exit. Only a sink-close failure or a final-save
    /// failure propagates.
    pub fn stop(&self) -> Result<(), SyncError> {
        {
            let mut state = self.state.write().expect("state lock poisoned");
            *state = EngineState::Stopped;
        }
        self.background_cancel.store(true, Ordering::SeqCst);

        let mut tasks = self.tasks.lock().expect("tasks lock poisoned");
        if let Some(watcher) = tasks.watcher.take() {
            watcher.stop();
        }
        if let Some(coalescer) = tasks.coalescer.take() {
            coalescer.stop();
        }
        if let Some(handle) = tasks.scanner_handle.take() {
            let _ = handle.join();
        }
        if let Some(handle) = tasks.periodic_save_handle.take() {
            let _ = handle.join();
        }
        if let Some(handle) = tasks.metrics_handle.take() {
            let _ = handle.join();
        }
        drop(tasks);

        self.tracker.save_to_disk()?;
        self.sink.close()?;
        self.embedding_sink.close()?;
        Ok(())
    }

    fn spawn_scanner(self: &Arc<Self>, root: PathBuf) -> JoinHandle<()> {
        let engine = Arc::clone(self);
        let cancelled = Arc::clone(&self.background_cancel);
        let interval = Duration::from_secs(self.config.effective_scan_interval_secs());

        thread::Builder::new()
            .name("syncgraph-scanner".to_string())
            .spawn(move || {
                let mut scanner = match RevisionControlScanner::open(&root) {
                    Ok(s) => s,
                    Err(e) => {
                        tracing::warn!(error = %e, "revision-control scanner disabled: root is not a repository");
                        return;
                    }
                };
                while !cancelled.load(Ordering::SeqCst) {
                    thread::sleep(interval);
                    if cancelled.load(Ordering::SeqCst) {
                        break;
                    }
                    match scanner.scan() {
                        Ok(changes) => {
                            for change in filter_supported(changes) {
                                let kind = match change.status {
                                    VcsStatus::Added | VcsStatus::Modified => ChangeKind::Modify,
                                    VcsStatus::Removed => ChangeKind::Remove,
                                };
                                engine.dispatch_raw_event(root.join(&change.path), kind);
                            }
                        }
                        Err(e) => tracing::warn!(error = %e, "revision-control scan failed"),
                    }
                }
            })
            .expect("failed to spawn scanner thread")
    }

    fn spawn_periodic_save(self: &Arc<Self>) -> JoinHandle<()> {
        let tracker = Arc::clone(&self.tracker);
        let cancelled = Arc::clone(&self.background_cancel);
        let interval = Duration::from_secs(syncgraph_core::constants::DEFAULT_STATE_SAVE_INTERVAL_SECS);

        thread::Builder::new()
            .name("syncgraph-periodic-save".to_string())
            .spawn(move || {
                while !cancelled.load(Ordering::SeqCst) {
                    thread::sleep(interval);
                    if let Err(e) = tracker.save_to_disk() {
                        tracing::warn!(error = %e, "periodic fingerprint save failed, continuing");
                    }
                }
            })
            .expect("failed to spawn periodic-save thread")
    }

    fn spawn_metrics_updater(self: &Arc<Self>, root: PathBuf) -> JoinHandle<()> {
        let metrics = Arc::clone(&self.metrics);
        let tracker = Arc::clone(&self.tracker);
        let cancelled = Arc::clone(&self.background_cancel);
        let interval = Duration::from_secs(syncgraph_core::constants::DEFAULT_METRICS_INTERVAL_SECS);

        thread::Builder::new()
            .name("syncgraph-metrics-updater".to_string())
            .spawn(move || {
                let _ = &root;
                while !cancelled.load(Ordering::SeqCst) {
                    thread::sleep(interval);
                    metrics.set_files_monitored(tracker.tracked_count());
                }
            })
            .expect("failed to spawn metrics-updater thread")
    }

    /// Entry point for both the watcher and the scanner: applies the
    /// batching toggle (§4.7). If batching is enabled, the event is
    /// coalesced; otherwise the pipeline runs inline.
    fn dispatch_raw_event(self: &Arc<Self>, path: PathBuf, kind: ChangeKind) {
        let tasks = self.tasks.lock().expect("tasks lock poisoned");
        if let Some(coalescer) = tasks.coalescer.as_ref() {
            coalescer.add(syncgraph_core::types::ChangeEvent::new(path, kind));
        } else {
            drop(tasks);
            let _ = self.process_event(path, kind);
        }
    }

    /// The nine-step pipeline for one raw path event (§4.7).
    fn process_event(&self, path: PathBuf, kind: ChangeKind) -> Result<(), ()> {
        // Step 1: pause gate.
        if self.is_paused() {
            return Ok(());
        }

        // Step 2: support filter.
        if !syncgraph_core::constants::is_supported_path(&path) {
            return Ok(());
        }

        // Step 3: change gate.
        let status = self.tracker.has_changed(&path);
        let effective_kind = match (kind, status) {
            (_, ChangeStatus::No) => return Ok(()),
            (ChangeKind::Remove, _) => ChangeKind::Remove,
            (_, ChangeStatus::Missing) => ChangeKind::Remove,
            (other, ChangeStatus::Yes) => other,
        };

        if effective_kind == ChangeKind::Remove {
            self.handle_removal(&path);
            return Ok(());
        }

        let started = Instant::now();

        // Step 4: parse.
        let parsed = match self.parser.parse(&path) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "parse failed");
                self.metrics.record_error();
                return Err(());
            }
        };

        // Step 5: rebase path to be relative to the root.
        let relative_path = self.rebase(&path);
        let mut parsed = parsed;
        parsed.path = relative_path.clone();

        // Step 6: diff (optional mode). A no-op diff returns here: steps
        // 7-9 (fingerprint commit, embedding push, metrics/publish) do not
        // run for a change that altered no tracked entity.
        let mut had_error = false;
        if self.config.effective_enable_diff() {
            let (delta, has_changes) = self.differ.analyze(parsed.clone());
            if !has_changes {
                tracing::debug!(path = %relative_path, "no-op diff, skipping sink apply");
                return Ok(());
            }
            had_error |= self.apply_delta(&delta);
        } else {
            had_error |= self.apply_full(&parsed);
        }

        // Step 7: fingerprint commit.
        if let Err(e) = self.tracker.update_state(&path) {
            tracing::warn!(path = %path.display(), error = %e, "fingerprint commit failed, continuing");
        }

        // Step 8: embedding sink (unconditional; diff mode does not
        // short-circuit embeddings — §9 open question 2).
        if self.config.effective_enable_embeddings() {
            if let Err(e) = self.embedding_sink.upsert_file_embeddings(&parsed) {
                tracing::warn!(path = %relative_path, error = %e, "embedding sink failed");
            }
        }

        // Step 9: metrics + control-plane event.
        self.metrics.record_processed(started.elapsed());
        self.metrics.record_change_detected();
        let control_kind = match kind {
            ChangeKind::Create => ControlEventKind::Create,
            ChangeKind::Modify => ControlEventKind::Modify,
            ChangeKind::Remove => ControlEventKind::Remove,
        };
        self.publish(ControlEvent::new(control_kind, Some(path)));

        if had_error {
            self.metrics.record_error();
            Err(())
        } else {
            Ok(())
        }
    }

    fn handle_removal(&self, path: &PathBuf) {
        let relative_path = self.rebase(path);
        self.tracker.remove_state(path);
        self.differ.drop_path(&relative_path);
        self.publish(ControlEvent::new(ControlEventKind::Remove, Some(path.clone())));
    }

    fn rebase(&self, path: &PathBuf) -> String {
        match self.config.effective_root() {
            Some(root) => path
                .strip_prefix(root)
                .unwrap_or(path)
                .to_string_lossy()
                .into_owned(),
            None => path.to_string_lossy().into_owned(),
        }
    }

    /// Full-file upsert (diff mode disabled): every entity and
    /// relationship in the parse is applied, in file-then-entities-then-
    /// relationships order. A failed entity logs and does not abort the
    /// file; the file as a whole counts as errored for the caller.
    fn apply_full(&self, parsed: &ParsedFile) -> bool {
        let mut had_error = self.upsert_file_node(&parsed.path, parsed.language);

        macro_rules! apply_all {
            ($field:ident, $method:ident) => {
                for entity in &parsed.$field {
                    if let Err(e) = self.sink.$method(entity) {
                        tracing::warn!(op = stringify!($method), error = %e, "sink upsert failed");
                        had_error = true;
                    }
                }
            };
        }

        apply_all!(functions, upsert_function);
        apply_all!(classes, upsert_class);
        apply_all!(interfaces, upsert_interface);
        apply_all!(types, upsert_type);
        apply_all!(variables, upsert_variable);
        apply_all!(constants, upsert_constant);
        apply_all!(imports, upsert_import);
        apply_all!(css_rules, upsert_css_rule);
        apply_all!(jsx_elements, upsert_jsx_element);
        apply_all!(function_calls, upsert_function_call);
        apply_all!(type_usages, upsert_type_usage);
        apply_all!(extends, upsert_extends);
        apply_all!(implements, upsert_implements);
        apply_all!(references, upsert_reference);

        had_error
    }

    /// Diff-mode apply: only `added` and `modified` entities are upserted;
    /// `removed` entities are logged, per the design notes (removal
    /// support from the sink remains an open question, §9).
    fn apply_delta(&self, delta: &EntityDelta) -> bool {
        let mut had_error = false;

        macro_rules! apply_delta_kind {
            ($field:ident, $method:ident) => {
                for entity in delta.$field.added.iter().chain(delta.$field.modified.iter()) {
                    if let Err(e) = self.sink.$method(entity) {
                        tracing::warn!(op = stringify!($method), error = %e, "sink upsert failed");
                        had_error = true;
                    }
                }
                if !delta.$field.removed.is_empty() {
                    tracing::debug!(
                        kind = stringify!($field),
                        count = delta.$field.removed.len(),
                        "removed entities not upserted; sink deletion out of scope"
                    );
                }
            };
        }

        apply_delta_kind!(functions, upsert_function);
        apply_delta_kind!(classes, upsert_class);
        apply_delta_kind!(interfaces, upsert_interface);
        apply_delta_kind!(types, upsert_type);
        apply_delta_kind!(variables, upsert_variable);
        apply_delta_kind!(constants, upsert_constant);
        apply_delta_kind!(imports, upsert_import);
        apply_delta_kind!(css_rules, upsert_css_rule);
        apply_delta_kind!(jsx_elements, upsert_jsx_element);
        apply_delta_kind!(function_calls, upsert_function_call);
        apply_delta_kind!(type_usages, upsert_type_usage);
        apply_delta_kind!(extends, upsert_extends);
        apply_delta_kind!(implements, upsert_implements);
        apply_delta_kind!(references, upsert_reference);

        had_error
    }

    fn upsert_file_node(&self, path: &str, language: Option<Language>) -> bool {
        let Some(language) = language else { return false };
        if let Err(e) = self.sink.upsert_file(path, language) {
            tracing::warn!(path, error = %e, "upsert_file failed");
            true
        } else {
            false
        }
    }
}
