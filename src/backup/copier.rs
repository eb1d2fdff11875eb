use crate::backup::checksum::ChecksumVerifier;
use crate::backup::engine::PendingTasks;
use crate::backup::retry::RetryPolicy;
use rayon::ThreadPool;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::debug;

/// Source paths whose copy could not be completed after exhausting retries.
///
/// Shared by every worker of one engine run; each run gets its own set, so
/// concurrent runs never see each other's failures. Appends are serialized by
/// the inner mutex; the final read happens only after the engine drains.
#[derive(Debug, Default)]
pub struct FailureSet {
    paths: Mutex<Vec<PathBuf>>,
}

impl FailureSet {
    pub fn record(&self, path: PathBuf) {
        self.paths.lock().unwrap().push(path);
    }

    pub fn is_empty(&self) -> bool {
        self.paths.lock().unwrap().is_empty()
    }

    pub fn len(&self) -> usize {
        self.paths.lock().unwrap().len()
    }

    pub fn snapshot(&self) -> Vec<PathBuf> {
        self.paths.lock().unwrap().clone()
    }
}

/// Why a single copy attempt did not produce a verified destination file.
///
/// Both variants are retryable and indistinguishable in the terminal outcome.
#[derive(Error, Debug)]
pub enum CopyAttemptError {
    #[error("file copy failed: {path:?}: {source}")]
    Copy {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("checksum verification failed: {path:?}")]
    ChecksumMismatch { path: PathBuf },
}

/// Copies individual files on the engine's worker pool.
///
/// `submit` is fire-and-forget from the producer's perspective; the queued
/// task retries the whole copy-and-verify unit and records a terminal failure
/// in the shared [`FailureSet`].
pub struct FileCopier {
    retry: RetryPolicy,
    verifier: ChecksumVerifier,
    pool: Arc<ThreadPool>,
    pending: Arc<PendingTasks>,
    failed: Arc<FailureSet>,
}

impl FileCopier {
    pub fn new(
        retry: RetryPolicy,
        verifier: ChecksumVerifier,
        pool: Arc<ThreadPool>,
        pending: Arc<PendingTasks>,
        failed: Arc<FailureSet>,
    ) -> Self {
        Self {
            retry,
            verifier,
            pool,
            pending,
            failed,
        }
    }

    /// Enqueues one copy task on the worker pool and returns immediately.
    pub fn submit(&self, source_file: PathBuf, destination_file: PathBuf) {
        debug!(
            "Submitting file for copy: {:?} -> {:?}",
            source_file, destination_file
        );
        let retry = self.retry;
        let verifier = self.verifier;
        let pending = Arc::clone(&self.pending);
        let failed = Arc::clone(&self.failed);

        self.pending.task_submitted();
        self.pool.spawn(move || {
            copy_file_with_retry(retry, verifier, &failed, &source_file, &destination_file);
            pending.task_finished();
        });
    }
}

/// The single retried unit: copy, then verify, as one operation.
fn copy_file_with_retry(
    retry: RetryPolicy,
    verifier: ChecksumVerifier,
    failed: &FailureSet,
    source_file: &Path,
    destination_file: &Path,
) {
    let file_name = source_file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| source_file.to_string_lossy().into_owned());

    let success = retry.run(format!("Copying file {file_name}"), || {
        copy_and_verify(verifier, source_file, destination_file)
    });

    if !success {
        failed.record(source_file.to_path_buf());
    }
}

fn copy_and_verify(
    verifier: ChecksumVerifier,
    source_file: &Path,
    destination_file: &Path,
) -> Result<(), CopyAttemptError> {
    if source_file.is_dir() {
        // Directory tasks only mirror the entry itself, never its contents.
        std::fs::create_dir_all(destination_file).map_err(|e| CopyAttemptError::Copy {
            path: source_file.to_path_buf(),
            source: e,
        })?;
        debug!(
            "Skipping checksum verification for directory: {:?}",
            source_file
        );
        return Ok(());
    }

    std::fs::copy(source_file, destination_file).map_err(|e| CopyAttemptError::Copy {
        path: source_file.to_path_buf(),
        source: e,
    })?;
    debug!("File copied: {:?} -> {:?}", source_file, destination_file);

    if verifier.verify(source_file, destination_file) {
        Ok(())
    } else {
        Err(CopyAttemptError::ChecksumMismatch {
            path: source_file.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn test_copier(max_attempts: u32) -> (FileCopier, Arc<PendingTasks>, Arc<FailureSet>) {
        let pool = Arc::new(
            rayon::ThreadPoolBuilder::new()
                .num_threads(2)
                .build()
                .unwrap(),
        );
        let pending = Arc::new(PendingTasks::default());
        let failed = Arc::new(FailureSet::default());
        let copier = FileCopier::new(
            RetryPolicy::new(max_attempts, Duration::from_millis(1)),
            ChecksumVerifier,
            pool,
            Arc::clone(&pending),
            Arc::clone(&failed),
        );
        (copier, pending, failed)
    }

    #[test]
    fn test_submit_copies_and_verifies() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("src.txt");
        let destination = temp_dir.path().join("dst.txt");
        std::fs::write(&source, b"payload").unwrap();

        let (copier, pending, failed) = test_copier(3);
        copier.submit(source.clone(), destination.clone());
        assert!(pending.wait_drained(Duration::from_secs(10)));

        assert_eq!(std::fs::read(&destination).unwrap(), b"payload");
        assert!(failed.is_empty());
    }

    #[test]
    fn test_missing_source_recorded_exactly_once() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("does-not-exist.txt");
        let destination = temp_dir.path().join("dst.txt");

        let (copier, pending, failed) = test_copier(3);
        copier.submit(source.clone(), destination);
        assert!(pending.wait_drained(Duration::from_secs(10)));

        assert_eq!(failed.snapshot(), vec![source]);
    }

    #[test]
    fn test_overwrites_existing_destination() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("src.txt");
        let destination = temp_dir.path().join("dst.txt");
        std::fs::write(&source, b"new content").unwrap();
        std::fs::write(&destination, b"stale content").unwrap();

        let (copier, pending, failed) = test_copier(3);
        copier.submit(source, destination.clone());
        assert!(pending.wait_drained(Duration::from_secs(10)));

        assert_eq!(std::fs::read(&destination).unwrap(), b"new content");
        assert!(failed.is_empty());
    }

    #[test]
    fn test_concurrent_failures_all_recorded() {
        let temp_dir = TempDir::new().unwrap();
        let (copier, pending, failed) = test_copier(1);

        let sources: Vec<_> = (0..16)
            .map(|i| temp_dir.path().join(format!("missing-{i}.txt")))
            .collect();
        for source in &sources {
            copier.submit(source.clone(), temp_dir.path().join("out.txt"));
        }
        assert!(pending.wait_drained(Duration::from_secs(10)));

        let mut recorded = failed.snapshot();
        recorded.sort();
        let mut expected = sources;
        expected.sort();
        assert_eq!(recorded, expected);
    }
}
