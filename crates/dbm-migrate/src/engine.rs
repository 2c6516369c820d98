//! Migration apply loop
//!
//! Walks a [`MigrationSet`] in ascending version order. Units at or below
//! the current ledger version are skipped. Every other unit runs in its own
//! transaction together with its ledger record, and the first failure stops
//! the loop with the ledger still at the last committed version.

use crate::clock::Clock;
use crate::error::{MigrateError, MigrateResult};
use crate::ledger::Ledger;
use dbm_core::{MigrationSet, MigrationUnit};
use dbm_db::{Database, DatabaseCore, DatabaseTransaction};
use dbm_sql::StatementSplitter;
use serde::Serialize;
use std::path::PathBuf;

/// A unit committed during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedMigration {
    pub version: i64,
    pub source_path: PathBuf,
    /// Statements executed from the script
    pub statements: usize,
    /// Timestamp written to the ledger record
    pub applied_at_millis: i64,
}

/// Outcome of one pass over a migration set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub applied: Vec<AppliedMigration>,
    pub skipped: usize,
}

/// Applies pending migration units against a database
pub struct MigrationEngine<'a> {
    db: &'a dyn Database,
    ledger: &'a Ledger,
    splitter: &'a StatementSplitter,
    clock: &'a dyn Clock,
}

impl<'a> MigrationEngine<'a> {
    pub fn new(
        db: &'a dyn Database,
        ledger: &'a Ledger,
        splitter: &'a StatementSplitter,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            db,
            ledger,
            splitter,
            clock,
        }
    }

    /// Apply every unit above `current_version`, ascending, stopping at the
    /// first failure.
    pub async fn run(
        &self,
        set: &MigrationSet,
        current_version: i64,
    ) -> MigrateResult<ApplyReport> {
        let mut report = ApplyReport::default();
        let mut ledger_version = current_version;

        for unit in set.units() {
            if unit.version <= current_version {
                log::debug!(
                    "Skipping {} (version {} <= {})",
                    unit.source_path.display(),
                    unit.version,
                    current_version
                );
                report.skipped += 1;
                continue;
            }

            log::info!(
                "Migrating {} to version {}",
                unit.source_path.display(),
                unit.version
            );

            match self.apply_unit(&unit).await {
                Ok(applied) => {
                    ledger_version = applied.version;
                    report.applied.push(applied);
                }
                Err(e) => {
                    log::error!(
                        "Migration failed for {} to version {}, ledger remains at {}",
                        unit.source_path.display(),
                        unit.version,
                        ledger_version
                    );
                    return Err(e);
                }
            }
        }

        Ok(report)
    }

    /// Execute one unit and its ledger record atomically
    async fn apply_unit(&self, unit: &MigrationUnit) -> MigrateResult<AppliedMigration> {
        let version = unit.version;
        let path = unit.source_path.display().to_string();

        let script = std::fs::read_to_string(&unit.source_path).map_err(|source| {
            MigrateError::ScriptRead {
                version,
                path: path.clone(),
                source,
            }
        })?;
        let statements = self
            .splitter
            .split(&script)
            .map_err(|source| MigrateError::Split {
                version,
                path: path.clone(),
                source,
            })?;

        self.db
            .begin()
            .await
            .map_err(|source| MigrateError::TransactionBegin {
                version,
                path: path.clone(),
                source,
            })?;

        for (i, statement) in statements.iter().enumerate() {
            log::debug!("Will exec {}", statement);
            if let Err(source) = self.db.execute(statement).await {
                self.rollback_quietly(version).await;
                return Err(MigrateError::StatementExecution {
                    version,
                    path,
                    statement: i + 1,
                    source,
                });
            }
        }

        let applied_at_millis = self.clock.now_millis();
        if let Err(e) = self
            .ledger
            .record_applied(self.db, version, applied_at_millis, &unit.source_path)
            .await
        {
            self.rollback_quietly(version).await;
            return Err(e);
        }

        if let Err(source) = self.db.commit().await {
            self.rollback_quietly(version).await;
            return Err(MigrateError::Commit {
                version,
                path,
                source,
            });
        }

        log::info!("Migrated {} to version {}", path, version);
        Ok(AppliedMigration {
            version,
            source_path: unit.source_path.clone(),
            statements: statements.len(),
            applied_at_millis,
        })
    }

    async fn rollback_quietly(&self, version: i64) {
        if let Err(e) = self.db.rollback().await {
            log::warn!("Rollback of version {} failed: {}", version, e);
        }
    }
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
