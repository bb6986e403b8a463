//! Error types for every runtime concern. Library crates only ever return
//! these; `anyhow` context is added at the CLI boundary, not here.

use std::path::PathBuf;

use thiserror::Error;

/// Failures from the Content Tracker: hashing a file, or persisting /
/// loading the fingerprint state file.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize fingerprint state: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to parse fingerprint state file: {0}")]
    Deserialize(#[source] serde_json::Error),
}

/// Failures surfaced by a [`crate::traits::GraphSink`] or
/// [`crate::traits::EmbeddingSink`] implementation.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("sink construction failed: {0}")]
    Construction(String),

    #[error("sink upsert failed for {path}: {message}")]
    Upsert { path: PathBuf, message: String },

    #[error("sink close failed: {0}")]
    Close(String),
}

/// Failures from the revision-control scanner.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("repository not found at {path}")]
    NotARepository { path: PathBuf },

    #[error("revision-control operation failed: {0}")]
    Backend(String),
}

/// Top-level error returned from [`SyncEngine::stop`] — the only place the
/// engine's public API can return an error per the runtime failure policy.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("fingerprint save failed during shutdown: {0}")]
    FinalSave(#[from] TrackerError),

    #[error("sink close failed during shutdown: {0}")]
    SinkClose(#[from] SinkError),

    #[error("engine configuration invalid: {0}")]
    Config(String),
}

/// Stable string codes for error variants, for structured logging and
/// metrics labels, following the same convention the rest of the stack
/// uses for its error enums.
pub trait SyncErrorCode {
    fn code(&self) -> &'static str;
}

impl SyncErrorCode for TrackerError {
    fn code(&self) -> &'static str {
        match self {
            TrackerError::Io { .. } => "tracker.io",
            TrackerError::Serialize(_) => "tracker.serialize",
            TrackerError::Deserialize(_) => "tracker.deserialize",
        }
    }
}

impl SyncErrorCode for SinkError {
    fn code(&self) -> &'static str {
        match self {
            SinkError::Construction(_) => "sink.construction",
            SinkError::Upsert { .. } => "sink.upsert",
            SinkError::Close(_) => "sink.close",
        }
    }
}

impl SyncErrorCode for ScanError {
    fn code(&self) -> &'static str {
        match self {
            ScanError::NotARepository { .. } => "scan.not_a_repository",
            ScanError::Backend(_) => "scan.backend",
        }
    }
}

impl SyncErrorCode for SyncError {
    fn code(&self) -> &'static str {
        match self {
            SyncError::FinalSave(_) => "sync.final_save",
            SyncError::SinkClose(_) => "sync.sink_close",
            SyncError::Config(_) => "sync.config",
        }
    }
}
