//! Engine configuration. Every field is optional on the wire so a partial
//! TOML file layers cleanly over the built-in defaults; callers that build
//! the struct programmatically go through [`EngineConfig::effective_*`]
//! accessors rather than reading fields directly.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BATCH_FLUSH_SECS, DEFAULT_BATCH_RETRY_BOUND, DEFAULT_BATCH_SIZE,
    DEFAULT_SCAN_INTERVAL_SECS,
};

/// Configuration accepted by the sync engine's constructor. The engine
/// never reads environment variables or files itself; the process
/// bootstrap is responsible for producing one of these.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    /// Root of the working copy to watch. Required; has no default.
    pub root: Option<PathBuf>,

    /// Enable the batch coalescer. Default: `false` (process inline).
    #[serde(default)]
    pub enable_batching: Option<bool>,

    /// Batch coalescer size threshold `N`. Default: 50.
    #[serde(default)]
    pub batch_size: Option<usize>,

    /// Batch coalescer flush interval `T`, in seconds. Default: 5.
    #[serde(default)]
    pub batch_flush_interval_secs: Option<u64>,

    /// Batch coalescer retry bound `R`. Default: 3.
    #[serde(default)]
    pub batch_retry_bound: Option<u32>,

    /// Enable diff-mode processing (apply only deltas). Default: `false`.
    #[serde(default)]
    pub enable_diff: Option<bool>,

    /// Enable the revision-control scanner. Default: `false`.
    #[serde(default)]
    pub enable_revision_control: Option<bool>,

    /// Revision-control scanner poll interval, in seconds. Default: 30.
    #[serde(default)]
    pub scan_interval_secs: Option<u64>,

    /// Enable the embedding sink fan-out. Default: `false`.
    #[serde(default)]
    pub enable_embeddings: Option<bool>,
}

impl EngineConfig {
    pub fn effective_root(&self) -> Option<&PathBuf> {
        self.root.as_ref()
    }

    pub fn effective_enable_batching(&self) -> bool {
        self.enable_batching.unwrap_or(false)
    }

    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.unwrap_or(DEFAULT_BATCH_SIZE)
    }

    pub fn effective_batch_flush_interval_secs(&self) -> u64 {
        self.batch_flush_interval_secs
            .unwrap_or(DEFAULT_BATCH_FLUSH_SECS)
    }

    pub fn effective_batch_retry_bound(&self) -> u32 {
        self.batch_retry_bound.unwrap_or(DEFAULT_BATCH_RETRY_BOUND)
    }

    pub fn effective_enable_diff(&self) -> bool {
        self.enable_diff.unwrap_or(false)
    }

    pub fn effective_enable_revision_control(&self) -> bool {
        self.enable_revision_control.unwrap_or(false)
    }

    pub fn effective_scan_interval_secs(&self) -> u64 {
        self.scan_interval_secs.unwrap_or(DEFAULT_SCAN_INTERVAL_SECS)
    }

    pub fn effective_enable_embeddings(&self) -> bool {
        self.enable_embeddings.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let cfg = EngineConfig::default();
        assert!(!cfg.effective_enable_batching());
        assert_eq!(cfg.effective_batch_size(), DEFAULT_BATCH_SIZE);
        assert_eq!(cfg.effective_batch_retry_bound(), DEFAULT_BATCH_RETRY_BOUND);
    }

    #[test]
    fn toml_round_trip_with_partial_fields() {
        let toml_src = "enable_batching = true\nbatch_size = 10\n";
        let cfg: EngineConfig = toml::from_str(toml_src).unwrap();
        assert!(cfg.effective_enable_batching());
        assert_eq!(cfg.effective_batch_size(), 10);
        assert_eq!(
            cfg.effective_batch_flush_interval_secs(),
            DEFAULT_BATCH_FLUSH_SECS
        );
    }
}
