//! Revision-Control Scanner (§4.4). On a 30-second tick, asks the working
//! copy for paths changed since the last scan and emits synthetic change
//! events. Complementary to the watcher, not a replacement — the content
//! tracker's change gate absorbs duplicate notifications idempotently.

use std::path::{Path, PathBuf};

use git2::{Oid, Repository};
use syncgraph_core::errors::ScanError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VcsStatus {
    Added,
    Modified,
    Removed,
}

#[derive(Debug, Clone)]
pub struct VcsChange {
    pub path: PathBuf,
    pub status: VcsStatus,
}

/// Wraps a `git2::Repository`, tracking the last head revision it scanned.
pub struct RevisionControlScanner {
    repo: Repository,
    last_head: Option<Oid>,
}

impl RevisionControlScanner {
    pub fn open(root: &Path) -> Result<Self, ScanError> {
        let repo = Repository::open(root).map_err(|_| ScanError::NotARepository {
            path: root.to_path_buf(),
        })?;
        Ok(Self { repo, last_head: None })
    }

    /// Captures the current head; if unchanged from the last capture,
    /// returns working-copy status. If changed, diffs between the prior
    /// and current head trees and advances the stored head.
    pub fn scan(&mut self) -> Result<Vec<VcsChange>, ScanError> {
        let head_oid = self
            .repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .map(|c| c.id())
            .map_err(|e| ScanError::Backend(e.to_string()))?;

        let changes = match self.last_head {
            Some(prior) if prior == head_oid => self.working_copy_changes()?,
            Some(prior) => self.changes_between(prior, head_oid)?,
            None => self.working_copy_changes()?,
        };

        self.last_head = Some(head_oid);
        Ok(changes)
    }

    fn working_copy_changes(&self) -> Result<Vec<VcsChange>, ScanError> {
        let mut opts = git2::StatusOptions::new();
        opts.include_untracked(true);
        let statuses = self
            .repo
            .statuses(Some(&mut opts))
            .map_err(|e| ScanError::Backend(e.to_string()))?;

        let mut changes = Vec::new();
        for entry in statuses.iter() {
            let Some(path) = entry.path() else { continue };
            let flags = entry.status();
            let status = if flags.is_wt_deleted() || flags.is_index_deleted() {
                VcsStatus::Removed
            } else if flags.is_wt_new() || flags.is_index_new() {
                VcsStatus::Added
            } else {
                VcsStatus::Modified
            };
            changes.push(VcsChange {
                path: PathBuf::from(path),
                status,
            });
        }
        Ok(changes)
    }

    fn changes_between(&self, prior: Oid, current: Oid) -> Result<Vec<VcsChange>, ScanError> {
        let prior_tree = self
            .repo
            .find_commit(prior)
            .and_then(|c| c.tree())
            .map_err(|e| ScanError::Backend(e.to_string()))?;
        let current_tree = self
            .repo
            .find_commit(current)
            .and_then(|c| c.tree())
            .map_err(|e| ScanError::Backend(e.to_string()))?;

        let diff = self
            .repo
            .diff_tree_to_tree(Some(&prior_tree), Some(&current_tree), None)
            .map_err(|e| ScanError::Backend(e.to_string()))?;

        let mut changes = Vec::new();
        diff.foreach(
            &mut |delta, _progress| {
                use git2::Delta as D;
                let status = match delta.status() {
                    D::Added | D::Copied => Some(VcsStatus::Added),
                    D::Deleted => Some(VcsStatus::Removed),
                    // Renames are split into a remove + add at this
                    // implementation's discretion (§4.4).
                    D::Renamed => None,
                    _ => Some(VcsStatus::Modified),
                };

                if let Some(status) = status {
                    if let Some(path) = delta.new_file().path() {
                        changes.push(VcsChange {
                            path: path.to_path_buf(),
                            status,
                        });
                    }
                } else {
                    if let Some(old) = delta.old_file().path() {
                        changes.push(VcsChange {
                            path: old.to_path_buf(),
                            status: VcsStatus::Removed,
                        });
                    }
                    if let Some(new) = delta.new_file().path() {
                        changes.push(VcsChange {
                            path: new.to_path_buf(),
                            status: VcsStatus::Added,
                        });
                    }
                }
                true
            },
            None,
            None,
            None,
        )
        .map_err(|e| ScanError::Backend(e.to_string()))?;

        Ok(changes)
    }
}

/// Only paths whose extension passes the support filter propagate to the
/// engine; `Added`/`Modified` enter as modify events, `Removed` as remove
/// events.
pub fn filter_supported(changes: Vec<VcsChange>) -> Vec<VcsChange> {
    changes
        .into_iter()
        .filter(|c| syncgraph_core::constants::is_supported_path(&c.path))
        .collect()
}
