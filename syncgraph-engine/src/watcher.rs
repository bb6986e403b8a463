//! Filesystem Watcher (§4.5). Registers watches on every directory under
//! the root except the skip list, dynamically adding new subdirectories,
//! and translates OS notifications into raw [`ChangeEvent`]s dispatched to
//! a handler closure.
//!
//! Initial enumeration is grounded on the teacher's ignore-aware parallel
//! walk (`drift-analysis::scanner::walker::walk_directory`); the live
//! notification stream itself has no teacher-side precedent (Drift scans
//! a tree once per invocation rather than watching it continuously), so
//! it is grounded on the wider example pack's `notify` usage, chosen with
//! the `crossbeam-channel` feature so it feeds the same channel substrate
//! as every other long-lived task in this engine.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::Receiver;
use ignore::WalkBuilder;
use notify::{
    Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher,
};
use syncgraph_core::constants::{is_skip_dir, is_supported_path};
use syncgraph_core::types::{ChangeEvent, ChangeKind};

pub type EventHandler = dyn Fn(ChangeEvent) + Send + Sync;

pub struct FsWatcher {
    cancelled: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl FsWatcher {
    /// Walks `root` to register the initial watch set, then spawns a
    /// thread that drains the `notify` event stream for the lifetime of
    /// the engine, dispatching translated events to `handler`.
    pub fn start(root: &Path, handler: Arc<EventHandler>) -> Self {
        let cancelled = Arc::new(AtomicBool::new(false));
        let root = root.to_path_buf();
        let loop_cancelled = Arc::clone(&cancelled);

        let handle = thread::Builder::new()
            .name("syncgraph-watcher".to_string())
            .spawn(move || run(root, handler, loop_cancelled))
            .expect("failed to spawn watcher thread");

        Self {
            cancelled,
            handle: Some(handle),
        }
    }

    pub fn stop(mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run(root: PathBuf, handler: Arc<EventHandler>, cancelled: Arc<AtomicBool>) {
    let (tx, rx) = crossbeam_channel::bounded(1024);
    let mut watcher = match RecommendedWatcher::new(tx, Config::default()) {
        Ok(w) => w,
        Err(e) => {
            tracing::error!(error = %e, "failed to construct filesystem watcher");
            return;
        }
    };

    for dir in watchable_directories(&root) {
        if let Err(e) = watcher.watch(&dir, RecursiveMode::NonRecursive) {
            tracing::warn!(path = %dir.display(), error = %e, "failed to watch directory, continuing");
        }
    }

    drain(&rx, &mut watcher, &handler, &cancelled);
}

/// Directory enumeration for the initial watch set, skipping the literal
/// skip-dir names. Grounded on the teacher's `ignore::WalkBuilder` usage
/// for parallel-walking a tree while respecting an override list.
fn watchable_directories(root: &Path) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(false)
        .filter_entry(|entry| {
            entry
                .file_name()
                .to_str()
                .map(|name| !is_skip_dir(name))
                .unwrap_or(true)
        })
        .build();

    for entry in walker.flatten() {
        if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            dirs.push(entry.path().to_path_buf());
        }
    }
    dirs
}

fn drain(
    rx: &Receiver<notify::Result<Event>>,
    watcher: &mut RecommendedWatcher,
    handler: &Arc<EventHandler>,
    cancelled: &Arc<AtomicBool>,
) {
    loop {
        if cancelled.load(Ordering::SeqCst) {
            return;
        }
        match rx.recv_timeout(std::time::Duration::from_millis(200)) {
            Ok(Ok(event)) => handle_event(event, watcher, handler),
            Ok(Err(e)) => tracing::warn!(error = %e, "filesystem watcher error"),
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => continue,
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => return,
        }
    }
}

fn handle_event(event: Event, watcher: &mut RecommendedWatcher, handler: &Arc<EventHandler>) {
    match event.kind {
        EventKind::Create(notify::event::CreateKind::Folder) => {
            for path in &event.paths {
                if dir_name_is_skippable(path) {
                    continue;
                }
                if let Err(e) = watcher.watch(path, RecursiveMode::NonRecursive) {
                    tracing::warn!(path = %path.display(), error = %e, "failed to watch new directory, continuing");
                }
            }
        }
        EventKind::Create(_) | EventKind::Modify(_) => {
            for path in &event.paths {
                if is_supported_path(path) {
                    handler(ChangeEvent::new(path.clone(), ChangeKind::Modify));
                }
            }
        }
        EventKind::Remove(_) => {
            for path in &event.paths {
                if is_supported_path(path) {
                    if path.exists() {
                        // Platform-dependent: the path still exists after
                        // the remove notification, treat it as a modify.
                        handler(ChangeEvent::new(path.clone(), ChangeKind::Modify));
                    } else {
                        handler(ChangeEvent::new(path.clone(), ChangeKind::Remove));
                    }
                }
            }
        }
        _ => {}
    }
}

fn dir_name_is_skippable(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(is_skip_dir)
        .unwrap_or(false)
}
