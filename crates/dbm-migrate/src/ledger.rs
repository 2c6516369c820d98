//! Versioning ledger
//!
//! An append-only table with one row per applied migration. The current
//! version is the `migrator_version` of the most recently inserted row
//! (highest `id`), which is not necessarily the numeric maximum.

use crate::error::{MigrateError, MigrateResult};
use dbm_core::config::DEFAULT_LEDGER_TABLE;
use dbm_db::{Database, DatabaseCore, DatabaseTransaction, DbError, Row, SqlValue};
use serde::Serialize;
use std::path::Path;

/// SQL text for the ledger table, built from the table name alone
#[derive(Debug, Clone)]
pub struct LedgerSql {
    table: String,
}

impl LedgerSql {
    /// `table` must be a plain SQL identifier; it is spliced into the SQL text
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
        }
    }

    /// Ledger table name
    pub fn table(&self) -> &str {
        &self.table
    }

    fn sequence(&self) -> String {
        format!("{}_id_seq", self.table)
    }

    /// Idempotent statements creating the id sequence and the ledger table
    pub fn create_if_absent(&self) -> Vec<String> {
        let sequence = self.sequence();
        vec![
            format!("CREATE SEQUENCE IF NOT EXISTS {sequence} START 1"),
            format!(
                "CREATE TABLE IF NOT EXISTS {table} (
    id BIGINT PRIMARY KEY DEFAULT nextval('{sequence}'),
    migrator_version BIGINT NOT NULL,
    migrator_timestamp BIGINT NOT NULL,
    file_path VARCHAR(255) NOT NULL
)",
                table = self.table
            ),
        ]
    }

    /// Most recently inserted record, at most one row
    pub fn select_current(&self) -> String {
        format!(
            "SELECT id, migrator_version, migrator_timestamp FROM {} ORDER BY id DESC LIMIT 1",
            self.table
        )
    }

    /// Parameterized insert: version, timestamp, file path
    pub fn insert_record(&self) -> String {
        format!(
            "INSERT INTO {} (migrator_version, migrator_timestamp, file_path) VALUES (?, ?, ?)",
            self.table
        )
    }

    /// Every record in insertion order
    pub fn select_history(&self) -> String {
        format!(
            "SELECT id, migrator_version, migrator_timestamp, file_path FROM {} ORDER BY id",
            self.table
        )
    }
}

/// One row of the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerRecord {
    pub id: i64,
    pub version: i64,
    pub applied_at_millis: i64,
    pub source_path: String,
}

impl LedgerRecord {
    fn from_row(row: &Row) -> Result<Self, DbError> {
        let cell = |i: usize| row.get(i).unwrap_or(&SqlValue::Null);
        Ok(Self {
            id: cell(0).as_i64(0)?,
            version: cell(1).as_i64(1)?,
            applied_at_millis: cell(2).as_i64(2)?,
            source_path: cell(3).as_str(3)?.to_string(),
        })
    }
}

/// Operations on the versioning table
#[derive(Debug, Clone)]
pub struct Ledger {
    sql: LedgerSql,
}

impl Ledger {
    /// Ledger stored in `table`
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            sql: LedgerSql::new(table),
        }
    }

    /// SQL builder backing this ledger
    pub fn sql(&self) -> &LedgerSql {
        &self.sql
    }

    /// Create the ledger table if absent, inside its own transaction
    pub async fn ensure_table_exists(&self, db: &dyn Database) -> MigrateResult<()> {
        db.begin().await.map_err(MigrateError::LedgerInit)?;

        for statement in self.sql.create_if_absent() {
            log::debug!("Will exec {}", statement);
            if let Err(e) = db.execute(&statement).await {
                if let Err(rollback_err) = db.rollback().await {
                    log::error!(
                        "Rollback after ledger initialization failure failed: {rollback_err}"
                    );
                }
                return Err(MigrateError::LedgerInit(e));
            }
        }

        db.commit().await.map_err(MigrateError::LedgerInit)
    }

    /// Version of the most recently inserted record, or 0 for an empty ledger
    pub async fn current_version(&self, db: &dyn Database) -> MigrateResult<i64> {
        let rows = db
            .query_rows(&self.sql.select_current())
            .await
            .map_err(MigrateError::LedgerRead)?;

        match rows.first() {
            Some(row) => row
                .get(1)
                .unwrap_or(&SqlValue::Null)
                .as_i64(1)
                .map_err(MigrateError::LedgerRead),
            None => Ok(0),
        }
    }

    /// Append a record for `version`.
    ///
    /// Must run inside the transaction that executed the migration's own
    /// statements so both commit or roll back together.
    pub async fn record_applied(
        &self,
        db: &dyn Database,
        version: i64,
        applied_at_millis: i64,
        source_path: &Path,
    ) -> MigrateResult<()> {
        let path = source_path.display().to_string();
        let params = [
            SqlValue::Integer(version),
            SqlValue::Integer(applied_at_millis),
            SqlValue::Text(path.clone()),
        ];

        db.execute_params(&self.sql.insert_record(), &params)
            .await
            .map_err(|source| MigrateError::LedgerWrite {
                version,
                path,
                source,
            })?;

        log::info!(
            "{} update to {} {}",
            self.sql.table(),
            version,
            applied_at_millis
        );
        Ok(())
    }

    /// Every record in insertion order
    pub async fn history(&self, db: &dyn Database) -> MigrateResult<Vec<LedgerRecord>> {
        let rows = db
            .query_rows(&self.sql.select_history())
            .await
            .map_err(MigrateError::LedgerRead)?;

        rows.iter()
            .map(LedgerRecord::from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(MigrateError::LedgerRead)
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(DEFAULT_LEDGER_TABLE)
    }
}

#[cfg(test)]
#[path = "ledger_test.rs"]
mod tests;
