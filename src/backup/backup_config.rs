use crate::backup::validate::{
    validate_dir_exist, validate_snapshot_prefix, validate_writable_dir,
};
use bon::Builder;
use chrono::{DateTime, TimeZone};
use getset::Getters;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::PathBuf;
use std::time::Duration;
use validator::Validate;

static TIME_FORMAT: &str = "%Y-%m-%d_%H%M_%S";

/// Backup run configuration, loaded from a YAML file.
///
/// Everything except the source and destination directories has a default:
/// pool size follows the host's available parallelism, retries are 3 attempts
/// starting at one second, and the exclusion list covers common temp/cache
/// paths.
#[derive(Clone, Debug, Serialize, Deserialize, Validate, Builder, Getters)]
#[serde(deny_unknown_fields)]
#[getset(get = "pub")]
pub struct BackupConfig {
    #[validate(custom(function = validate_dir_exist))]
    #[builder(into)]
    source_dir: PathBuf,
    #[validate(custom(function = validate_writable_dir))]
    #[builder(into)]
    destination_dir: PathBuf,
    #[serde(default = "default_snapshot_prefix")]
    #[validate(custom(function = validate_snapshot_prefix))]
    #[builder(default = default_snapshot_prefix(), into)]
    snapshot_prefix: String,
    #[serde(default = "default_thread_pool_size")]
    #[builder(default = default_thread_pool_size())]
    thread_pool_size: usize,
    #[serde(default = "default_max_retries")]
    #[builder(default = default_max_retries())]
    max_retries: u32,
    #[serde(default = "default_retry_delay", with = "humantime_serde")]
    #[builder(default = default_retry_delay())]
    retry_delay: Duration,
    #[serde(default = "default_exclusion_patterns")]
    #[builder(default = default_exclusion_patterns(), into)]
    exclusion_patterns: Vec<String>,
    #[serde(default = "default_max_backups_to_keep")]
    #[builder(default = default_max_backups_to_keep())]
    max_backups_to_keep: usize,
}

fn default_snapshot_prefix() -> String {
    "backup".to_string()
}

fn default_thread_pool_size() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_exclusion_patterns() -> Vec<String> {
    [
        r".*\.tmp",
        r".*\.swp",
        r".*~",
        r".*/\.cache",
        r".*/\.DS_Store",
        r".*/Thumbs\.db",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

fn default_max_backups_to_keep() -> usize {
    5
}

impl BackupConfig {
    /// Name of the snapshot directory created for a run started at `dt`.
    pub fn snapshot_dir_name<O: Display, T: TimeZone<Offset = O>>(&self, dt: DateTime<T>) -> String {
        format!("{}_{}", self.snapshot_prefix, dt.format(TIME_FORMAT))
    }

    /// Full path of the timestamped snapshot directory for a run started at
    /// `dt`, under the configured destination root.
    pub fn versioned_backup_dir<O: Display, T: TimeZone<Offset = O>>(
        &self,
        dt: DateTime<T>,
    ) -> PathBuf {
        self.destination_dir.join(self.snapshot_dir_name(dt))
    }
}
