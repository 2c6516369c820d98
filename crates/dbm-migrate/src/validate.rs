//! Offline script validation
//!
//! Scans a migrations directory, splits each script and parses every
//! statement. No database connection is involved.

use crate::error::{MigrateError, MigrateResult};
use dbm_core::{scan_directory, DuplicatePolicy};
use dbm_sql::{validate_statements, StatementSplitter};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Syntax check result for one script
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileValidation {
    pub version: i64,
    pub source_path: PathBuf,
    pub statement_count: usize,
    pub issues: Vec<String>,
}

impl FileValidation {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Check every script under `migrations_dir`, in ascending version order.
///
/// Discovery errors and unreadable scripts fail the whole call; split and
/// parse failures are reported per file.
pub fn validate_scripts(
    migrations_dir: &Path,
    duplicates: DuplicatePolicy,
    splitter: &StatementSplitter,
) -> MigrateResult<Vec<FileValidation>> {
    let set = scan_directory(migrations_dir, duplicates)?;
    let mut results = Vec::with_capacity(set.len());

    for unit in set.units() {
        let path = unit.source_path.display().to_string();
        let script = std::fs::read_to_string(&unit.source_path).map_err(|source| {
            MigrateError::ScriptRead {
                version: unit.version,
                path: path.clone(),
                source,
            }
        })?;

        let validation = match splitter.split(&script) {
            Ok(statements) => {
                let issues = validate_statements(&statements, splitter.dialect())
                    .into_iter()
                    .map(|issue| format!("statement {}: {}", issue.index + 1, issue.error))
                    .collect();
                FileValidation {
                    version: unit.version,
                    source_path: unit.source_path,
                    statement_count: statements.len(),
                    issues,
                }
            }
            Err(e) => FileValidation {
                version: unit.version,
                source_path: unit.source_path,
                statement_count: 0,
                issues: vec![e.to_string()],
            },
        };

        if !validation.is_valid() {
            log::warn!("{} has {} issue(s)", path, validation.issues.len());
        }
        results.push(validation);
    }

    Ok(results)
}

#[cfg(test)]
#[path = "validate_test.rs"]
mod tests;
