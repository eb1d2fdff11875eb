use clap::Parser;
use std::fs::File;
use std::path::PathBuf;
use std::process::exit;
use std::time::Instant;
use tracing::{error, info, warn};
use treesnap::backup::backup_config::BackupConfig;
use treesnap::backup::cleaner::BackupCleaner;
use treesnap::backup::engine::{DrainStatus, ParallelTreeCopier, TreeCopier};
use treesnap::backup::exclude::ExclusionFilter;
use treesnap::backup::report::RunReport;
use treesnap::backup::result_error::error::Error;
use treesnap::backup::result_error::result::Result;
use treesnap::backup::result_error::WithMsg;
use treesnap::backup::retry::RetryPolicy;
use validator::Validate;

/// Create a timestamped backup of a directory tree and delete old backups
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Location of config file
    #[arg(short, long)]
    config: PathBuf,
}

fn main() {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    match run(&args.config) {
        Ok(report) => {
            info!("{}", report.summary());
            if !report.is_success() {
                exit(1);
            }
        }
        Err(e) => {
            error!("{e}");
            exit(1);
        }
    }
}

fn run(config_path: &PathBuf) -> Result<RunReport> {
    let config = File::open(config_path)
        .map_err(Error::from)
        .and_then(|f| {
            serde_yml::from_reader::<_, BackupConfig>(f)
                .map_err(Error::from)
                .with_msg(format!("Parse YAML config failed: {:?}", config_path))
        })
        .and_then(|bc| {
            bc.validate()
                .map_err(Error::from)
                .map(|_| bc)
                .with_msg(format!("Config validation failed: {:?}", config_path))
        })?;

    info!(
        "Starting backup from {:?} to {:?}",
        config.source_dir(),
        config.destination_dir()
    );

    let cleanup = BackupCleaner::new(config.destination_dir(), *config.max_backups_to_keep())
        .cleanup_old_backups();
    if !cleanup.any_deleted {
        info!("No backups were deleted");
    } else if cleanup.any_deletion_failed {
        warn!("Some old backups could not be deleted. Check logs for details");
    } else {
        info!("Old backups deleted successfully");
    }

    let snapshot_dir = config.versioned_backup_dir(chrono::Local::now());
    std::fs::create_dir_all(&snapshot_dir)
        .map_err(Error::from)
        .with_msg(format!(
            "Could not create versioned backup directory {:?}",
            snapshot_dir
        ))?;

    let copier = ParallelTreeCopier::new(
        *config.thread_pool_size(),
        RetryPolicy::new(*config.max_retries(), *config.retry_delay()),
        ExclusionFilter::new(config.exclusion_patterns()),
    )?;

    let start = Instant::now();
    let outcome = copier.copy_files(config.source_dir(), &snapshot_dir)?;
    let report = RunReport::new(start.elapsed(), outcome.failed_files);

    if outcome.drain == DrainStatus::TimedOut {
        warn!("Copy pool drain timed out; the failure report may be incomplete");
    }
    info!("Backup stored at: {:?}", snapshot_dir);

    Ok(report)
}
