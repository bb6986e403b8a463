//! Content Tracker (§4.1): per-file fingerprint (content hash + mtime),
//! persisted across restarts, answering "has this path changed?".
//!
//! Grounded on the teacher's incremental-analysis hash map
//! (`IncrementalAnalyzer`), generalized to also carry mtime and to persist
//! itself to a JSON state file rather than being handed previous hashes by
//! a caller.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use syncgraph_core::errors::TrackerError;
use syncgraph_core::types::{ChangeStatus, FingerprintRecord};

#[derive(Debug, Serialize, Deserialize)]
struct StateFileRecord {
    path: String,
    hash: String,
    modified: i64,
}

/// Maintains `path -> FingerprintRecord`. Read under a shared lock; safe
/// against concurrent `update_state` on a different path.
pub struct ContentTracker {
    state_file: PathBuf,
    records: RwLock<FxHashMap<PathBuf, FingerprintRecord>>,
}

impl ContentTracker {
    pub fn new(root: &Path, state_file_name: &str) -> Self {
        Self {
            state_file: root.join(state_file_name),
            records: RwLock::new(FxHashMap::default()),
        }
    }

    /// Stats the file; if missing, returns `Missing`. Otherwise hashes and
    /// compares against the stored record. Returns `Yes` if either the
    /// digest or mtime differs, or no record exists.
    pub fn has_changed(&self, path: &Path) -> ChangeStatus {
        let metadata = match fs::metadata(path) {
            Ok(m) => m,
            Err(_) => return ChangeStatus::Missing,
        };

        let current_hash = match hash_file(path) {
            Ok(h) => h,
            Err(_) => return ChangeStatus::Missing,
        };
        let current_mtime = mtime_secs(&metadata);

        let records = self.records.read().expect("tracker lock poisoned");
        match records.get(path) {
            None => ChangeStatus::Yes,
            Some(record) => {
                if record.content_hash != current_hash || record.mtime != current_mtime {
                    ChangeStatus::Yes
                } else {
                    ChangeStatus::No
                }
            }
        }
    }

    /// Recomputes and commits digest+mtime for `path`. Fails only on I/O
    /// error.
    pub fn update_state(&self, path: &Path) -> Result<(), TrackerError> {
        let metadata = fs::metadata(path).map_err(|source| TrackerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let content_hash = hash_file(path).map_err(|source| TrackerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let record = FingerprintRecord {
            path: path.to_path_buf(),
            content_hash,
            mtime: mtime_secs(&metadata),
        };
        self.records
            .write()
            .expect("tracker lock poisoned")
            .insert(path.to_path_buf(), record);
        Ok(())
    }

    /// Deletes the record for `path`. Idempotent.
    pub fn remove_state(&self, path: &Path) {
        self.records.write().expect("tracker lock poisoned").remove(path);
    }

    pub fn tracked_count(&self) -> usize {
        self.records.read().expect("tracker lock poisoned").len()
    }

    pub fn tracked_paths(&self) -> Vec<PathBuf> {
        self.records
            .read()
            .expect("tracker lock poisoned")
            .keys()
            .cloned()
            .collect()
    }

    /// Serialises the entire map to the state file at the tree root. The
    /// snapshot is taken under the read lock; the write itself happens
    /// outside it.
    pub fn save_to_disk(&self) -> Result<(), TrackerError> {
        let snapshot: Vec<StateFileRecord> = {
            let records = self.records.read().expect("tracker lock poisoned");
            records
                .values()
                .map(|r| StateFileRecord {
                    path: r.path.to_string_lossy().into_owned(),
                    hash: format!("{:032x}", r.content_hash),
                    modified: r.mtime,
                })
                .collect()
        };
        let json = serde_json::to_string_pretty(&snapshot).map_err(TrackerError::Serialize)?;
        fs::write(&self.state_file, json).map_err(|source| TrackerError::Io {
            path: self.state_file.clone(),
            source,
        })?;
        Ok(())
    }

    /// Loads the state file. On failure (missing or corrupt), starts
    /// empty and logs a warning; this is not fatal.
    pub fn load_from_disk(&self) {
        let contents = match fs::read_to_string(&self.state_file) {
            Ok(c) => c,
            Err(_) => return,
        };
        let parsed: Vec<StateFileRecord> = match serde_json::from_str(&contents) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(error = %e, "fingerprint state file is corrupt, starting empty");
                return;
            }
        };

        let mut records = self.records.write().expect("tracker lock poisoned");
        for entry in parsed {
            let hash = match u128::from_str_radix(&entry.hash, 16) {
                Ok(h) => h,
                Err(_) => continue,
            };
            let path = PathBuf::from(&entry.path);
            records.insert(
                path.clone(),
                FingerprintRecord {
                    path,
                    content_hash: hash,
                    mtime: entry.modified,
                },
            );
        }
    }
}

fn hash_file(path: &Path) -> std::io::Result<u128> {
    let bytes = fs::read(path)?;
    Ok(xxhash_rust::xxh3::xxh3_128(&bytes))
}

fn mtime_secs(metadata: &fs::Metadata) -> i64 {
    metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn unseen_path_is_yes() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.ts");
        fs::write(&file, b"hello").unwrap();
        let tracker = ContentTracker::new(dir.path(), ".syncgraph_state.json");
        assert!(matches!(tracker.has_changed(&file), ChangeStatus::Yes));
    }

    #[test]
    fn unchanged_bytes_after_update_is_no() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.ts");
        fs::write(&file, b"hello").unwrap();
        let tracker = ContentTracker::new(dir.path(), ".syncgraph_state.json");
        tracker.update_state(&file).unwrap();
        assert!(matches!(tracker.has_changed(&file), ChangeStatus::No));
    }

    #[test]
    fn missing_file_reports_missing() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("gone.ts");
        let tracker = ContentTracker::new(dir.path(), ".syncgraph_state.json");
        assert!(matches!(tracker.has_changed(&file), ChangeStatus::Missing));
    }

    #[test]
    fn round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.ts");
        let mut f = fs::File::create(&file).unwrap();
        f.write_all(b"hello").unwrap();
        drop(f);

        let tracker = ContentTracker::new(dir.path(), ".syncgraph_state.json");
        tracker.update_state(&file).unwrap();
        tracker.save_to_disk().unwrap();

        let reloaded = ContentTracker::new(dir.path(), ".syncgraph_state.json");
        reloaded.load_from_disk();
        assert!(matches!(reloaded.has_changed(&file), ChangeStatus::No));
    }

    #[test]
    fn corrupt_state_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".syncgraph_state.json"), b"not json").unwrap();
        let tracker = ContentTracker::new(dir.path(), ".syncgraph_state.json");
        tracker.load_from_disk();
        assert_eq!(tracker.tracked_count(), 0);
    }

    #[test]
    fn remove_state_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.ts");
        fs::write(&file, b"hello").unwrap();
        let tracker = ContentTracker::new(dir.path(), ".syncgraph_state.json");
        tracker.update_state(&file).unwrap();
        tracker.remove_state(&file);
        tracker.remove_state(&file);
        assert_eq!(tracker.tracked_count(), 0);
    }
}
