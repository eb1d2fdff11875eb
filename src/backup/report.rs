use itertools::Itertools;
use std::path::PathBuf;
use std::time::Duration;

/// What one backup run hands to a notification collaborator: how long the run
/// took and which source paths could not be backed up.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    pub duration: Duration,
    pub failed_files: Vec<PathBuf>,
}

impl RunReport {
    pub fn new(duration: Duration, failed_files: Vec<PathBuf>) -> Self {
        Self {
            duration,
            failed_files,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed_files.is_empty()
    }

    pub fn summary(&self) -> String {
        if self.failed_files.is_empty() {
            format!(
                "All files copied successfully! Backup took {}",
                format_duration(self.duration)
            )
        } else {
            format!(
                "Backup completed with {} failed file(s) in {}:\n{}",
                self.failed_files.len(),
                format_duration(self.duration),
                self.failed_files
                    .iter()
                    .map(|path| format!("- {}", path.display()))
                    .join("\n")
            )
        }
    }
}

/// Formats a duration as minutes and seconds, falling back to milliseconds
/// only when the duration is below one second.
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    let millis = duration.subsec_millis();

    let mut result = String::new();
    if minutes > 0 {
        result.push_str(&format!(
            "{} {}",
            minutes,
            if minutes == 1 { "minute" } else { "minutes" }
        ));
    }
    if seconds > 0 {
        if !result.is_empty() {
            result.push_str(", ");
        }
        result.push_str(&format!(
            "{} {}",
            seconds,
            if seconds == 1 { "second" } else { "seconds" }
        ));
    }
    if millis > 0 && minutes == 0 && seconds == 0 {
        result.push_str(&format!(
            "{} {}",
            millis,
            if millis == 1 {
                "millisecond"
            } else {
                "milliseconds"
            }
        ));
    }

    if result.is_empty() {
        "0 seconds".to_string()
    } else {
        result
    }
}
