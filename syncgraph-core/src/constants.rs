//! Literal constants from the external-interfaces contract. Kept in one
//! place so the watcher, scanner, and CLI all agree on them.

/// Case-sensitive file-extension suffixes the engine will process.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[".ts", ".tsx", ".js", ".jsx", ".css", ".scss"];

/// Base names of directories the watcher and initial walk never descend into.
pub const SKIP_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    "dist",
    "build",
    ".next",
    "coverage",
    "vendor",
    ".vscode",
    ".idea",
    "__pycache__",
    ".pytest_cache",
];

/// Name of the fingerprint persistence file, relative to the watched root.
pub const STATE_FILE_NAME: &str = ".syncgraph_state.json";

/// Revision-control scanner poll interval, in seconds.
pub const DEFAULT_SCAN_INTERVAL_SECS: u64 = 30;

/// Fingerprint map persistence interval, in seconds.
pub const DEFAULT_STATE_SAVE_INTERVAL_SECS: u64 = 300;

/// Metrics gauge refresh interval, in seconds.
pub const DEFAULT_METRICS_INTERVAL_SECS: u64 = 10;

/// Batch coalescer default size threshold.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Batch coalescer default flush interval, in seconds.
pub const DEFAULT_BATCH_FLUSH_SECS: u64 = 5;

/// Batch coalescer retry bound: a path dropped after this many consecutive
/// failed flushes.
pub const DEFAULT_BATCH_RETRY_BOUND: u32 = 3;

/// Returns true if `path` has one of the [`SUPPORTED_EXTENSIONS`] suffixes.
pub fn is_supported_path(path: &std::path::Path) -> bool {
    let Some(name) = path.to_str() else {
        return false;
    };
    SUPPORTED_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

/// Returns true if `name` (a single path component) is in the skip list.
pub fn is_skip_dir(name: &str) -> bool {
    SKIP_DIRS.contains(&name)
}
