//! Error types for dbm-migrate

use dbm_core::CoreError;
use dbm_db::DbError;
use dbm_sql::SqlError;
use thiserror::Error;

/// Migration run errors
///
/// Every variant raised while processing a migration unit names the version
/// and script involved.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Versioning table could not be created (M001)
    #[error("[M001] Ledger initialization failed: {0}")]
    LedgerInit(#[source] DbError),

    /// Current version could not be read (M002)
    #[error("[M002] Ledger read failed: {0}")]
    LedgerRead(#[source] DbError),

    /// Version record could not be inserted (M003)
    #[error("[M003] Failed to record version {version} for '{path}': {source}")]
    LedgerWrite {
        version: i64,
        path: String,
        source: DbError,
    },

    /// A migration statement failed and the transaction was rolled back (M004)
    #[error("[M004] Migration to version {version} failed in '{path}' at statement {statement}: {source}")]
    StatementExecution {
        version: i64,
        path: String,
        statement: usize,
        source: DbError,
    },

    /// Commit failed after every statement succeeded (M005)
    #[error("[M005] Commit of version {version} from '{path}' failed: {source}")]
    Commit {
        version: i64,
        path: String,
        source: DbError,
    },

    /// Transaction could not be opened (M006)
    #[error("[M006] Could not begin transaction for version {version} from '{path}': {source}")]
    TransactionBegin {
        version: i64,
        path: String,
        source: DbError,
    },

    /// Script content could not be read (M007)
    #[error("[M007] Failed to read script for version {version} '{path}': {source}")]
    ScriptRead {
        version: i64,
        path: String,
        source: std::io::Error,
    },

    /// Script could not be split into statements (M008)
    #[error("[M008] Failed to split script for version {version} '{path}': {source}")]
    Split {
        version: i64,
        path: String,
        source: SqlError,
    },

    /// Script discovery failed (M009)
    #[error("[M009] Migration discovery failed: {0}")]
    Scan(#[from] CoreError),
}

impl MigrateError {
    /// Version being processed when the error occurred, if any
    pub fn version(&self) -> Option<i64> {
        match self {
            MigrateError::LedgerWrite { version, .. }
            | MigrateError::StatementExecution { version, .. }
            | MigrateError::Commit { version, .. }
            | MigrateError::TransactionBegin { version, .. }
            | MigrateError::ScriptRead { version, .. }
            | MigrateError::Split { version, .. } => Some(*version),
            MigrateError::LedgerInit(_) | MigrateError::LedgerRead(_) | MigrateError::Scan(_) => {
                None
            }
        }
    }
}

/// Result type alias for MigrateError
pub type MigrateResult<T> = Result<T, MigrateError>;
