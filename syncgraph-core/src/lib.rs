//! Core types, traits, errors, config, and constants shared by every
//! syncgraph crate.

pub mod config;
pub mod constants;
pub mod errors;
pub mod traits;
pub mod types;

pub use config::EngineConfig;
pub use errors::{SinkError, SyncError, SyncErrorCode, TrackerError};
pub use traits::{EmbeddingSink, GraphSink, SourceParser};
pub use types::{
    ChangeEvent, ChangeKind, ChangeStatus, EntityDelta, FingerprintRecord, Language,
    ParseCacheEntry, ParsedFile,
};

pub use rustc_hash::{FxHashMap, FxHashSet};
