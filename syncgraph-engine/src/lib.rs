//! The continuous synchronization engine: content tracker, parse cache and
//! differ, batch coalescer, revision-control scanner, filesystem watcher,
//! metrics recorder, and the orchestrating sync engine.

pub mod coalescer;
pub mod control;
pub mod diff;
pub mod engine;
pub mod metrics;
pub mod tracker;
pub mod vcs;
pub mod watcher;

pub use coalescer::BatchCoalescer;
pub use control::{ControlEvent, ControlEventKind, EventSubscriber};
pub use diff::Differ;
pub use engine::{EngineState, SyncEngine};
pub use metrics::{EngineStats, MetricsRecorder};
pub use tracker::ContentTracker;
pub use vcs::{RevisionControlScanner, VcsChange, VcsStatus};
pub use watcher::FsWatcher;
