//! Script repository scanner
//!
//! Walks a migration directory recursively and decodes a version from every
//! regular file found beneath it. A single undecodable name fails the whole
//! scan; no partial result is returned.

use crate::config::DuplicatePolicy;
use crate::error::{CoreError, CoreResult};
use crate::migration::{parse_version, MigrationSet, MigrationUnit};
use std::path::Path;
use walkdir::WalkDir;

/// Scan `dir` and build the set of migration units it contains.
///
/// Entries are visited in file-name order within each directory so that
/// the "later-visited" file under [`DuplicatePolicy::LastWins`] is
/// deterministic across platforms.
pub fn scan_directory(dir: &Path, duplicates: DuplicatePolicy) -> CoreResult<MigrationSet> {
    let mut set = MigrationSet::new();

    for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| CoreError::DirectoryScan {
            path: e.path().unwrap_or(dir).display().to_string(),
            message: e.to_string(),
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let version = parse_version(path)?;
        log::debug!("Found {} with version {}", path.display(), version);

        let unit = MigrationUnit {
            version,
            source_path: path.to_path_buf(),
        };

        if let Some(existing) = set.get(version) {
            match duplicates {
                DuplicatePolicy::Error => {
                    return Err(CoreError::DuplicateVersion {
                        version,
                        first: existing.display().to_string(),
                        second: path.display().to_string(),
                    });
                }
                DuplicatePolicy::LastWins => {
                    log::warn!(
                        "Version {} from {} replaces {}",
                        version,
                        path.display(),
                        existing.display()
                    );
                }
            }
        }

        set.insert(unit);
    }

    log::debug!("Discovered {} migration(s) in {}", set.len(), dir.display());
    Ok(set)
}

#[cfg(test)]
#[path = "scanner_test.rs"]
mod tests;
