use crate::backup::copier::FileCopier;
use crate::backup::exclude::ExclusionFilter;
use crate::backup::result_error::result::Result;
use std::path::Path;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Walks the source tree, mirrors its directory structure and hands every
/// non-excluded file to the [`FileCopier`].
///
/// Traversal is single-threaded and never waits on submitted copy tasks.
/// Excluded entries are skipped without being descended into. A destination
/// directory that cannot be created aborts the whole run; there is no retry
/// at this layer.
pub struct DirectoryProcessor<'a> {
    file_copier: &'a FileCopier,
    exclusions: &'a ExclusionFilter,
}

impl<'a> DirectoryProcessor<'a> {
    pub fn new(file_copier: &'a FileCopier, exclusions: &'a ExclusionFilter) -> Self {
        Self {
            file_copier,
            exclusions,
        }
    }

    pub fn process_directory(&self, source_dir: &Path, destination_dir: &Path) -> Result<()> {
        let walker = WalkDir::new(source_dir)
            .follow_links(true)
            .into_iter()
            .filter_entry(|entry| {
                // The source root itself is never matched against exclusions.
                if entry.depth() == 0 {
                    return true;
                }
                if self.exclusions.is_excluded(entry.path()) {
                    info!("Excluding: {:?}", entry.path());
                    false
                } else {
                    true
                }
            });

        for entry in walker {
            let entry = entry?;
            let relative = entry
                .path()
                .strip_prefix(source_dir)
                .map_err(|e| std::io::Error::other(e.to_string()))?;
            let target = destination_dir.join(relative);

            if entry.file_type().is_dir() {
                std::fs::create_dir_all(&target)?;
                debug!("Created directory: {:?}", target);
            } else {
                self.file_copier.submit(entry.into_path(), target);
            }
        }

        Ok(())
    }
}
