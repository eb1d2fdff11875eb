use crate::backup::checksum::ChecksumVerifier;
use crate::backup::copier::{FailureSet, FileCopier};
use crate::backup::exclude::ExclusionFilter;
use crate::backup::result_error::result::Result;
use crate::backup::retry::RetryPolicy;
use crate::backup::walker::DirectoryProcessor;
use derive_more::Display;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};

/// How long the engine waits for queued and in-flight tasks after traversal.
/// When it elapses the run proceeds with whatever the failure set holds, so
/// the report may be incomplete; [`DrainStatus::TimedOut`] makes that visible.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(60);

/// Terminal drain state of one engine run.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum DrainStatus {
    #[display("completed")]
    Completed,
    #[display("timed out")]
    TimedOut,
}

/// Result of one tree copy: every permanently failed source path, plus
/// whether the pool drained before the timeout.
#[derive(Debug)]
pub struct CopyOutcome {
    pub failed_files: Vec<PathBuf>,
    pub drain: DrainStatus,
}

/// Counts submitted-but-unfinished copy tasks for one engine run.
#[derive(Debug, Default)]
pub struct PendingTasks {
    count: Mutex<usize>,
    drained: Condvar,
}

impl PendingTasks {
    pub fn task_submitted(&self) {
        *self.count.lock().unwrap() += 1;
    }

    pub fn task_finished(&self) {
        let mut count = self.count.lock().unwrap();
        *count -= 1;
        if *count == 0 {
            self.drained.notify_all();
        }
    }

    /// Blocks until every submitted task finished, or `timeout` elapses.
    /// Returns whether the pool fully drained.
    pub fn wait_drained(&self, timeout: Duration) -> bool {
        let count = self.count.lock().unwrap();
        let (count, _) = self
            .drained
            .wait_timeout_while(count, timeout, |count| *count > 0)
            .unwrap();
        *count == 0
    }
}

/// Capability to mirror one directory tree into another.
///
/// Consuming `self` makes an instance one-shot: the worker pool belongs to
/// exactly one run and is never reused.
pub trait TreeCopier {
    fn copy_files(self, source_dir: &Path, destination_dir: &Path) -> Result<CopyOutcome>;
}

/// The concurrent copy engine: a fixed-size worker pool fed by a
/// single-threaded directory walk.
pub struct ParallelTreeCopier {
    pool: Arc<ThreadPool>,
    retry: RetryPolicy,
    exclusions: ExclusionFilter,
    pending: Arc<PendingTasks>,
    failed: Arc<FailureSet>,
}

impl ParallelTreeCopier {
    pub fn new(
        thread_pool_size: usize,
        retry: RetryPolicy,
        exclusions: ExclusionFilter,
    ) -> Result<Self> {
        info!(
            "Initializing with thread pool size: {}, max attempts: {}",
            thread_pool_size,
            retry.max_attempts()
        );
        let pool = ThreadPoolBuilder::new()
            .num_threads(thread_pool_size)
            .build()?;

        Ok(Self {
            pool: Arc::new(pool),
            retry,
            exclusions,
            pending: Arc::new(PendingTasks::default()),
            failed: Arc::new(FailureSet::default()),
        })
    }
}

impl TreeCopier for ParallelTreeCopier {
    fn copy_files(self, source_dir: &Path, destination_dir: &Path) -> Result<CopyOutcome> {
        let file_copier = FileCopier::new(
            self.retry,
            ChecksumVerifier,
            Arc::clone(&self.pool),
            Arc::clone(&self.pending),
            Arc::clone(&self.failed),
        );

        // Returns once all tasks are submitted, not once they are complete.
        DirectoryProcessor::new(&file_copier, &self.exclusions)
            .process_directory(source_dir, destination_dir)?;
        drop(file_copier);

        debug!("Waiting for all tasks to complete...");
        let drain = if self.pending.wait_drained(DRAIN_TIMEOUT) {
            DrainStatus::Completed
        } else {
            warn!("Timeout! Not all files were copied.");
            DrainStatus::TimedOut
        };
        debug!("Pool drain {}", drain);

        let failed_files = self.failed.snapshot();
        if failed_files.is_empty() {
            info!("All files copied successfully!");
        } else {
            warn!("Backup completed with {} failed file(s):", failed_files.len());
            for failed_file in &failed_files {
                warn!("- {:?}", failed_file);
            }
        }

        Ok(CopyOutcome {
            failed_files,
            drain,
        })
    }
}
