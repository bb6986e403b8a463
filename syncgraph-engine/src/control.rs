//! Control-plane events the engine publishes to an optional subscriber
//! (§6 subscription channel). Shaped as a dedicated event enum rather than
//! a loosely-typed map, following the teacher's per-event-struct
//! `DriftEventHandler` convention (`ScanStartedEvent`, `ScanCompleteEvent`,
//! ...) generalized to the one subscriber callback this engine exposes.

use std::path::PathBuf;
use std::time::SystemTime;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlEventKind {
    Connected,
    Create,
    CreateDir,
    Modify,
    Remove,
    Rename,
}

#[derive(Debug, Clone)]
pub struct ControlEvent {
    pub kind: ControlEventKind,
    pub file_path: Option<PathBuf>,
    pub timestamp: SystemTime,
    pub details: Option<String>,
}

impl ControlEvent {
    pub fn new(kind: ControlEventKind, file_path: Option<PathBuf>) -> Self {
        Self {
            kind,
            file_path,
            timestamp: SystemTime::now(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

pub type EventSubscriber = dyn Fn(ControlEvent) + Send + Sync;
