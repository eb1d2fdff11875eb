//! # treesnap
//!
//! A point-in-time directory backup tool with integrity verification and
//! retention management.
//!
//! ## Features
//!
//! - **Timestamped Snapshots**: Each run mirrors the source tree into a new
//!   `<prefix>_<timestamp>` directory under the destination root
//! - **Parallel Copying**: A fixed-size worker pool copies files concurrently
//! - **Integrity Verification**: Every copy is checked with a SHA-256 digest
//! - **Transient-Failure Tolerance**: Failed copies retry with exponential
//!   backoff before being reported
//! - **Exclusion Rules**: Regex patterns keep temp/cache paths out of backups
//! - **Retention Management**: Old snapshots beyond a configurable count are
//!   removed before each run
//!
//! ## Quick Start
//!
//! ```no_run
//! use treesnap::backup::backup_config::BackupConfig;
//! use treesnap::backup::cleaner::BackupCleaner;
//! use treesnap::backup::engine::{ParallelTreeCopier, TreeCopier};
//! use treesnap::backup::exclude::ExclusionFilter;
//! use treesnap::backup::retry::RetryPolicy;
//!
//! // Load configuration from YAML file
//! let config: BackupConfig = serde_yml::from_reader(std::fs::File::open("config.yml")?)?;
//!
//! // Retire old snapshots, then mirror the source into a fresh one
//! BackupCleaner::new(config.destination_dir(), *config.max_backups_to_keep())
//!     .cleanup_old_backups();
//! let copier = ParallelTreeCopier::new(
//!     *config.thread_pool_size(),
//!     RetryPolicy::new(*config.max_retries(), *config.retry_delay()),
//!     ExclusionFilter::new(config.exclusion_patterns()),
//! )?;
//! let snapshot_dir = config.versioned_backup_dir(chrono::Local::now());
//! std::fs::create_dir_all(&snapshot_dir)?;
//! let outcome = copier.copy_files(config.source_dir(), &snapshot_dir)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod backup;
