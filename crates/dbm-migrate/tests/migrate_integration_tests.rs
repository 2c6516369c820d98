//! Integration tests for complete migration runs.
//!
//! Each test drives [`Migrator`] against a real DuckDB database, either
//! in memory or backed by a file in a temporary directory.

use dbm_core::{DuplicatePolicy, SplitStrategy};
use dbm_db::{DatabaseCore, DuckDbBackend, SqlValue};
use dbm_migrate::test_utils::{table_exists, write_script, write_two_scripts, RecordingDatabase};
use dbm_migrate::{FixedClock, Ledger, MigrateError, Migrator};
use std::path::Path;

// ── Helpers ────────────────────────────────────────────────────────────

async fn count(db: &dyn DatabaseCore, sql: &str) -> i64 {
    let rows = db.query_rows(sql).await.unwrap();
    rows[0][0].as_i64(0).unwrap()
}

// ── Full runs ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_two_scripts_from_empty_database() {
    let dir = tempfile::tempdir().unwrap();
    write_two_scripts(dir.path());
    let db = DuckDbBackend::in_memory().unwrap();

    let summary = Migrator::new(&db, dir.path()).run().await.unwrap();

    assert_eq!(summary.final_version, 2);
    assert_eq!(count(&db, "SELECT COUNT(*) FROM dbmigrator_versioning").await, 2);
    assert_eq!(count(&db, "SELECT COUNT(*) FROM dbmigrator_testone").await, 1);

    let rows = db
        .query_rows("SELECT id, column1, column2, column3 FROM dbmigrator_testone")
        .await
        .unwrap();
    assert_eq!(
        rows[0],
        vec![
            SqlValue::Integer(1),
            SqlValue::Integer(20),
            SqlValue::Integer(21),
            SqlValue::from("testing version 2"),
        ]
    );
}

#[tokio::test]
async fn test_resumes_from_recorded_version() {
    let dir = tempfile::tempdir().unwrap();
    let (first, _) = write_two_scripts(dir.path());
    let db = RecordingDatabase::in_memory();
    let ledger = Ledger::default();

    // version 1 was applied by an earlier run
    ledger.ensure_table_exists(&db).await.unwrap();
    db.execute(&std::fs::read_to_string(&first).unwrap())
        .await
        .unwrap();
    ledger.record_applied(&db, 1, 0, &first).await.unwrap();
    db.clear_calls();

    let summary = Migrator::new(&db, dir.path()).run().await.unwrap();

    assert_eq!(summary.starting_version, 1);
    assert_eq!(summary.skipped, 1);
    let scripts: Vec<String> = db
        .executed()
        .into_iter()
        .filter(|sql| !sql.contains("IF NOT EXISTS"))
        .collect();
    assert_eq!(scripts.len(), 1);
    assert!(scripts[0].starts_with("INSERT INTO dbmigrator_testone"));
    assert_eq!(ledger.current_version(&db).await.unwrap(), 2);
}

#[tokio::test]
async fn test_nested_directories_apply_in_version_order() {
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/nested");
    let db = DuckDbBackend::in_memory().unwrap();

    let summary = Migrator::new(&db, &fixtures).run().await.unwrap();

    let versions: Vec<i64> = summary.applied.iter().map(|a| a.version).collect();
    assert_eq!(versions, vec![1, 2, 3]);
    assert_eq!(
        count(&db, "SELECT CAST(SUM(balance) AS BIGINT) FROM accounts").await,
        350
    );
}

#[tokio::test]
async fn test_failure_keeps_earlier_units_and_stops() {
    let dir = tempfile::tempdir().unwrap();
    write_script(dir.path(), "a__1.sql", "CREATE TABLE t (id INTEGER PRIMARY KEY);");
    write_script(
        dir.path(),
        "b__2.sql",
        "INSERT INTO t VALUES (1);\nINSERT INTO t VALUES (1);",
    );
    write_script(dir.path(), "c__3.sql", "CREATE TABLE never (id INTEGER);");
    let db = DuckDbBackend::in_memory().unwrap();

    let err = Migrator::new(&db, dir.path()).run().await.unwrap_err();

    assert!(matches!(
        err,
        MigrateError::StatementExecution {
            version: 2,
            statement: 2,
            ..
        }
    ));
    assert_eq!(Ledger::default().current_version(&db).await.unwrap(), 1);
    assert_eq!(count(&db, "SELECT COUNT(*) FROM t").await, 0);
    assert!(!table_exists(&db, "never").await);
}

#[tokio::test]
async fn test_fixing_failed_script_and_rerunning() {
    let dir = tempfile::tempdir().unwrap();
    write_script(dir.path(), "a__1.sql", "CREATE TABLE t (id INTEGER);");
    write_script(dir.path(), "b__2.sql", "INSERT INTO missing VALUES (1);");
    let db = DuckDbBackend::in_memory().unwrap();
    let migrator = Migrator::new(&db, dir.path());

    assert!(migrator.run().await.is_err());

    write_script(dir.path(), "b__2.sql", "INSERT INTO t VALUES (1);");
    let summary = migrator.run().await.unwrap();

    assert_eq!(summary.starting_version, 1);
    assert_eq!(summary.final_version, 2);
    assert_eq!(count(&db, "SELECT COUNT(*) FROM t").await, 1);
}

// ── Splitting ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_naive_split_breaks_semicolon_in_literal() {
    let dir = tempfile::tempdir().unwrap();
    write_script(dir.path(), "a__1.sql", "CREATE TABLE notes (body VARCHAR);");
    write_script(dir.path(), "b__2.sql", "INSERT INTO notes VALUES ('a;b');");
    let db = DuckDbBackend::in_memory().unwrap();

    let err = Migrator::new(&db, dir.path()).run().await.unwrap_err();

    assert_eq!(err.version(), Some(2));
    assert_eq!(Ledger::default().current_version(&db).await.unwrap(), 1);
}

#[tokio::test]
async fn test_tokenized_split_keeps_literal_intact() {
    let dir = tempfile::tempdir().unwrap();
    write_script(dir.path(), "a__1.sql", "CREATE TABLE notes (body VARCHAR);");
    write_script(
        dir.path(),
        "b__2.sql",
        "-- seed; with a comment\nINSERT INTO notes VALUES ('a;b');",
    );
    let db = DuckDbBackend::in_memory().unwrap();

    Migrator::new(&db, dir.path())
        .with_split_strategy(SplitStrategy::Tokenized)
        .run()
        .await
        .unwrap();

    let rows = db.query_rows("SELECT body FROM notes").await.unwrap();
    assert_eq!(rows, vec![vec![SqlValue::from("a;b")]]);
}

#[tokio::test]
async fn test_trailing_comment_with_default_split() {
    let dir = tempfile::tempdir().unwrap();
    write_script(dir.path(), "a__1.sql", "CREATE TABLE c (x INT);\n-- done\n");
    let db = DuckDbBackend::in_memory().unwrap();

    let summary = Migrator::new(&db, dir.path()).run().await.unwrap();

    assert_eq!(summary.final_version, 1);
    assert_eq!(summary.applied[0].statements, 1);
    assert_eq!(count(&db, "SELECT COUNT(*) FROM c").await, 0);
}

// ── Persistence ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_file_database_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let migrations = dir.path().join("migrations");
    write_two_scripts(&migrations);
    let db_path = dir.path().join("app.duckdb");

    {
        let db = DuckDbBackend::from_path(&db_path).unwrap();
        let summary = Migrator::new(&db, &migrations)
            .with_clock(FixedClock(1_700_000_000_000))
            .run()
            .await
            .unwrap();
        assert_eq!(summary.final_version, 2);
    }

    let db = DuckDbBackend::from_path(&db_path).unwrap();
    let summary = Migrator::new(&db, &migrations).run().await.unwrap();
    assert_eq!(summary.starting_version, 2);
    assert!(summary.applied.is_empty());

    let history = Ledger::default().history(&db).await.unwrap();
    assert_eq!(history.len(), 2);
    assert!(history
        .iter()
        .all(|r| r.applied_at_millis == 1_700_000_000_000));
}

#[tokio::test]
async fn test_versions_beyond_32_bits() {
    let dir = tempfile::tempdir().unwrap();
    write_script(dir.path(), "a__1.sql", "CREATE TABLE t (id INTEGER);");
    let db = DuckDbBackend::in_memory().unwrap();
    let migrator = Migrator::new(&db, dir.path());
    migrator.run().await.unwrap();

    write_script(dir.path(), "b__3000000000.sql", "INSERT INTO t VALUES (1);");
    let summary = migrator.run().await.unwrap();

    assert_eq!(summary.final_version, 3_000_000_000);
    assert_eq!(
        Ledger::default().current_version(&db).await.unwrap(),
        3_000_000_000
    );
    assert_eq!(count(&db, "SELECT COUNT(*) FROM t").await, 1);
}

// ── Discovery ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_bad_filename_fails_whole_run() {
    let dir = tempfile::tempdir().unwrap();
    write_two_scripts(dir.path());
    write_script(dir.path(), "README.md", "# migrations");
    let db = DuckDbBackend::in_memory().unwrap();

    let err = Migrator::new(&db, dir.path()).run().await.unwrap_err();

    assert!(matches!(err, MigrateError::Scan(_)));
    assert!(!table_exists(&db, "dbmigrator_testone").await);
}

#[tokio::test]
async fn test_duplicate_policy_from_builder() {
    let dir = tempfile::tempdir().unwrap();
    write_script(dir.path(), "first__1.sql", "CREATE TABLE first (id INTEGER);");
    write_script(dir.path(), "second__1.sql", "CREATE TABLE second (id INTEGER);");
    let db = DuckDbBackend::in_memory().unwrap();

    let plan = Migrator::new(&db, dir.path())
        .with_duplicate_policy(DuplicatePolicy::LastWins)
        .plan()
        .await
        .unwrap();

    assert_eq!(plan.discovered, 1);
    assert!(plan.pending[0].source_path.ends_with("second__1.sql"));
}
