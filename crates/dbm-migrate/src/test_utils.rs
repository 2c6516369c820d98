//! Shared test utilities for dbm-migrate

use async_trait::async_trait;
use dbm_db::{
    DatabaseCore, DatabaseTransaction, DbError, DbResult, DuckDbBackend, Row, SqlValue,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// A call observed by [`RecordingDatabase`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbCall {
    Begin,
    Execute(String),
    ExecuteParams(String, Vec<SqlValue>),
    Commit,
    Rollback,
}

/// Database double that records every executor call and can inject
/// failures, delegating real work to an in-memory DuckDB.
pub struct RecordingDatabase {
    inner: DuckDbBackend,
    calls: Mutex<Vec<DbCall>>,
    fail_patterns: Mutex<Vec<String>>,
    fail_commit: AtomicBool,
}

impl RecordingDatabase {
    /// Wrap a fresh in-memory DuckDB
    pub fn in_memory() -> Self {
        Self {
            inner: DuckDbBackend::in_memory().expect("in-memory duckdb"),
            calls: Mutex::new(Vec::new()),
            fail_patterns: Mutex::new(Vec::new()),
            fail_commit: AtomicBool::new(false),
        }
    }

    /// Fail any statement whose text contains `pattern`
    pub fn fail_when_contains(&self, pattern: &str) {
        self.fail_patterns.lock().unwrap().push(pattern.to_string());
    }

    /// Make the next commits fail (the transaction is rolled back)
    pub fn fail_commits(&self, fail: bool) {
        self.fail_commit.store(fail, Ordering::SeqCst);
    }

    /// All calls in order
    pub fn calls(&self) -> Vec<DbCall> {
        self.calls.lock().unwrap().clone()
    }

    /// SQL of every plain `execute` call in order
    pub fn executed(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                DbCall::Execute(sql) => Some(sql),
                _ => None,
            })
            .collect()
    }

    /// Number of parameterized executions (ledger inserts)
    pub fn param_executions(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, DbCall::ExecuteParams(..)))
            .count()
    }

    /// Forget recorded calls
    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Underlying database, bypassing recording
    pub fn inner(&self) -> &DuckDbBackend {
        &self.inner
    }

    fn record(&self, call: DbCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_injected(&self, sql: &str) -> DbResult<()> {
        let patterns = self.fail_patterns.lock().unwrap();
        match patterns.iter().find(|p| sql.contains(p.as_str())) {
            Some(p) => Err(DbError::ExecutionError(format!(
                "injected failure on '{p}': {sql}"
            ))),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DatabaseCore for RecordingDatabase {
    async fn execute(&self, sql: &str) -> DbResult<usize> {
        self.record(DbCall::Execute(sql.to_string()));
        self.check_injected(sql)?;
        self.inner.execute(sql).await
    }

    async fn execute_params(&self, sql: &str, params: &[SqlValue]) -> DbResult<usize> {
        self.record(DbCall::ExecuteParams(sql.to_string(), params.to_vec()));
        self.check_injected(sql)?;
        self.inner.execute_params(sql, params).await
    }

    async fn query_rows(&self, sql: &str) -> DbResult<Vec<Row>> {
        self.inner.query_rows(sql).await
    }
}

#[async_trait]
impl DatabaseTransaction for RecordingDatabase {
    async fn begin(&self) -> DbResult<()> {
        self.record(DbCall::Begin);
        self.inner.begin().await
    }

    async fn commit(&self) -> DbResult<()> {
        self.record(DbCall::Commit);
        if self.fail_commit.load(Ordering::SeqCst) {
            self.inner.rollback().await?;
            return Err(DbError::TransactionError {
                operation: "COMMIT".to_string(),
                message: "injected commit failure".to_string(),
            });
        }
        self.inner.commit().await
    }

    async fn rollback(&self) -> DbResult<()> {
        self.record(DbCall::Rollback);
        self.inner.rollback().await
    }
}

/// Whether a table named `name` exists in any schema
pub async fn table_exists(db: &dyn DatabaseCore, name: &str) -> bool {
    let sql = format!("SELECT COUNT(*) FROM information_schema.tables WHERE table_name = '{name}'");
    let rows = db.query_rows(&sql).await.unwrap();
    rows[0][0].as_i64(0).unwrap() > 0
}

/// Write `content` to `dir/rel`, creating parent directories
pub fn write_script(dir: &Path, rel: &str, content: &str) -> PathBuf {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}

/// The two-script repository used by the end-to-end scenarios
pub fn write_two_scripts(dir: &Path) -> (PathBuf, PathBuf) {
    let first = write_script(
        dir,
        "Somesqlfile__1.sql",
        "CREATE TABLE dbmigrator_testone
(
    id INTEGER NOT NULL PRIMARY KEY,
    column1 INTEGER NOT NULL,
    column2 INTEGER NOT NULL,
    column3 VARCHAR(255) NOT NULL
);",
    );
    let second = write_script(
        dir,
        "Anothersqlfile_2__2.sql",
        "INSERT INTO dbmigrator_testone (id, column1, column2, column3) VALUES (1, 20, 21, 'testing version 2')",
    );
    (first, second)
}
