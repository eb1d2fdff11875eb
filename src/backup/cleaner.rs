use itertools::Itertools;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, error, info};
use walkdir::WalkDir;

/// Aggregated outcome of one retention pass.
///
/// `any_deleted` is set when at least one path was removed and
/// `any_deletion_failed` when at least one could not be; a partially deleted
/// snapshot sets both.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub any_deleted: bool,
    pub any_deletion_failed: bool,
}

impl CleanupReport {
    fn merge(&mut self, other: CleanupReport) {
        self.any_deleted |= other.any_deleted;
        self.any_deletion_failed |= other.any_deletion_failed;
    }
}

/// Retires old snapshot directories, keeping only the most recently modified
/// `max_backups` of them.
pub struct BackupCleaner {
    backup_base_dir: PathBuf,
    max_backups: usize,
}

impl BackupCleaner {
    pub fn new<P: Into<PathBuf>>(backup_base_dir: P, max_backups: usize) -> Self {
        let backup_base_dir = backup_base_dir.into();
        info!(
            "Initialized BackupCleaner with base directory: {:?} and max backups: {}",
            backup_base_dir, max_backups
        );
        Self {
            backup_base_dir,
            max_backups,
        }
    }

    /// Deletes the oldest snapshots beyond the retention limit.
    ///
    /// Deletion failures never abort the pass; they are folded into the
    /// report and the remaining snapshots are still attempted.
    pub fn cleanup_old_backups(&self) -> CleanupReport {
        info!("Starting cleanup of old backups in {:?}", self.backup_base_dir);
        let mut report = CleanupReport::default();

        let entries = match std::fs::read_dir(&self.backup_base_dir) {
            Ok(entries) => entries,
            Err(e) => {
                error!("Error while cleaning up backups: {}", e);
                return report;
            }
        };

        let backups = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .sorted_unstable_by_key(|path| sort_key(path))
            .collect_vec();
        debug!("Found {} backup directories", backups.len());

        if backups.len() > self.max_backups {
            let backups_to_delete = backups.len() - self.max_backups;
            info!("Deleting {} old backups...", backups_to_delete);

            for backup in &backups[..backups_to_delete] {
                report.merge(delete_backup(backup));
            }
        } else {
            info!(
                "No backups need to be deleted. Current count ({}) is within limit ({})",
                backups.len(),
                self.max_backups
            );
        }

        info!("Backup cleanup completed");
        report
    }
}

/// Oldest-first ordering: modification time, then path name for equal times.
/// Directories whose time cannot be read sort newest, so they are the last
/// candidates for deletion.
fn sort_key(path: &Path) -> (bool, SystemTime, PathBuf) {
    match std::fs::metadata(path).and_then(|metadata| metadata.modified()) {
        Ok(modified) => (false, modified, path.to_path_buf()),
        Err(e) => {
            error!("Failed to get last modified time for {:?}: {}", path, e);
            (true, SystemTime::UNIX_EPOCH, path.to_path_buf())
        }
    }
}

/// Removes one snapshot tree bottom-up, children before parents.
fn delete_backup(backup_dir: &Path) -> CleanupReport {
    info!("Attempting to delete backup directory: {:?}", backup_dir);
    let mut report = CleanupReport::default();

    for entry in WalkDir::new(backup_dir).contents_first(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                error!("Error deleting backup {:?}: {}", backup_dir, e);
                report.any_deletion_failed = true;
                continue;
            }
        };

        let removal = if entry.file_type().is_dir() {
            std::fs::remove_dir(entry.path())
        } else {
            std::fs::remove_file(entry.path())
        };
        match removal {
            Ok(()) => {
                debug!("Deleted: {:?}", entry.path());
                report.any_deleted = true;
            }
            Err(e) => {
                error!("Failed to delete {:?}: {}", entry.path(), e);
                report.any_deletion_failed = true;
            }
        }
    }

    if !report.any_deletion_failed {
        info!("Deleted old backup: {:?}", backup_dir);
    }
    report
}
