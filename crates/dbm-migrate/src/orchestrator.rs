//! Single-run orchestration
//!
//! A run is strictly sequential: make sure the ledger exists, read the
//! current version, discover the scripts, then hand the set to the apply
//! loop. Any failure ends the run and is returned to the caller.

use crate::clock::{Clock, SystemClock};
use crate::engine::{AppliedMigration, MigrationEngine};
use crate::error::MigrateResult;
use crate::ledger::{Ledger, LedgerRecord};
use crate::validate::{validate_scripts, FileValidation};
use dbm_core::{scan_directory, Config, DuplicatePolicy, MigrationSet, MigrationUnit, SplitStrategy};
use dbm_db::Database;
use dbm_sql::StatementSplitter;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Result of a completed run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Ledger version read before anything was applied
    pub starting_version: i64,
    /// Ledger version after the last committed unit
    pub final_version: i64,
    pub applied: Vec<AppliedMigration>,
    /// Discovered units at or below the starting version
    pub skipped: usize,
}

/// What a run would do, computed without executing any script
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationPlan {
    pub current_version: i64,
    /// Number of scripts found in the migrations directory
    pub discovered: usize,
    pub pending: Vec<MigrationUnit>,
}

/// Runs migrations from one directory against one database
pub struct Migrator<'a> {
    db: &'a dyn Database,
    migrations_dir: PathBuf,
    ledger: Ledger,
    splitter: StatementSplitter,
    duplicates: DuplicatePolicy,
    clock: Box<dyn Clock>,
}

impl<'a> Migrator<'a> {
    /// Migrator with default ledger table, naive splitting and the system clock
    pub fn new(db: &'a dyn Database, migrations_dir: impl Into<PathBuf>) -> Self {
        Self {
            db,
            migrations_dir: migrations_dir.into(),
            ledger: Ledger::default(),
            splitter: StatementSplitter::naive(),
            duplicates: DuplicatePolicy::default(),
            clock: Box::new(SystemClock),
        }
    }

    /// Migrator configured from a project config; relative migration paths
    /// resolve against `root`
    pub fn from_config(db: &'a dyn Database, config: &Config, root: &Path) -> Self {
        Self::new(db, config.migrations_path_absolute(root))
            .with_ledger_table(config.ledger.table.clone())
            .with_split_strategy(config.statement_splitting)
            .with_duplicate_policy(config.on_duplicate_version)
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_ledger_table(mut self, table: impl Into<String>) -> Self {
        self.ledger = Ledger::new(table);
        self
    }

    pub fn with_split_strategy(mut self, strategy: SplitStrategy) -> Self {
        self.splitter = StatementSplitter::new(strategy);
        self
    }

    pub fn with_duplicate_policy(mut self, duplicates: DuplicatePolicy) -> Self {
        self.duplicates = duplicates;
        self
    }

    /// Directory scanned for scripts
    pub fn migrations_dir(&self) -> &Path {
        &self.migrations_dir
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Bring the database up to the highest discovered version
    pub async fn run(&self) -> MigrateResult<RunSummary> {
        log::debug!("Ensuring ledger table {}", self.ledger.sql().table());
        self.ledger.ensure_table_exists(self.db).await?;

        let starting_version = self.ledger.current_version(self.db).await?;
        log::info!("Current version is {}", starting_version);

        let set = self.discover()?;

        let engine = MigrationEngine::new(
            self.db,
            &self.ledger,
            &self.splitter,
            self.clock.as_ref(),
        );
        let report = engine.run(&set, starting_version).await?;

        let final_version = report
            .applied
            .last()
            .map_or(starting_version, |a| a.version);
        if report.applied.is_empty() {
            log::info!("Nothing to migrate, version remains {}", final_version);
        } else {
            log::info!(
                "Applied {} migration(s), now at version {}",
                report.applied.len(),
                final_version
            );
        }

        Ok(RunSummary {
            starting_version,
            final_version,
            applied: report.applied,
            skipped: report.skipped,
        })
    }

    /// Units a run would apply. Creates the ledger table if absent but
    /// executes no script.
    pub async fn plan(&self) -> MigrateResult<MigrationPlan> {
        self.ledger.ensure_table_exists(self.db).await?;
        let current_version = self.ledger.current_version(self.db).await?;
        let set = self.discover()?;

        Ok(MigrationPlan {
            current_version,
            discovered: set.len(),
            pending: set.pending(current_version).collect(),
        })
    }

    /// Ledger records in insertion order
    pub async fn history(&self) -> MigrateResult<Vec<LedgerRecord>> {
        self.ledger.ensure_table_exists(self.db).await?;
        self.ledger.history(self.db).await
    }

    /// Split and parse every discovered script without touching the database
    pub fn validate(&self) -> MigrateResult<Vec<FileValidation>> {
        validate_scripts(&self.migrations_dir, self.duplicates, &self.splitter)
    }

    fn discover(&self) -> MigrateResult<MigrationSet> {
        let set = scan_directory(&self.migrations_dir, self.duplicates)?;
        log::debug!(
            "Discovered {} script(s) in {}",
            set.len(),
            self.migrations_dir.display()
        );
        Ok(set)
    }
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
