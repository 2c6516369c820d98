use super::*;
use crate::clock::FixedClock;
use crate::error::MigrateError;
use crate::test_utils::{table_exists, write_script, write_two_scripts, RecordingDatabase};
use dbm_db::{DatabaseCore, DuckDbBackend, SqlValue};

#[tokio::test]
async fn test_run_applies_all_from_empty_ledger() {
    let dir = tempfile::tempdir().unwrap();
    write_two_scripts(dir.path());
    let db = DuckDbBackend::in_memory().unwrap();

    let summary = Migrator::new(&db, dir.path())
        .with_clock(FixedClock(1_000))
        .run()
        .await
        .unwrap();

    assert_eq!(summary.starting_version, 0);
    assert_eq!(summary.final_version, 2);
    assert_eq!(summary.applied.len(), 2);
    assert_eq!(summary.skipped, 0);

    let rows = db
        .query_rows("SELECT column3 FROM dbmigrator_testone")
        .await
        .unwrap();
    assert_eq!(rows, vec![vec![SqlValue::from("testing version 2")]]);
}

#[tokio::test]
async fn test_second_run_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    write_two_scripts(dir.path());
    let db = RecordingDatabase::in_memory();
    let migrator = Migrator::new(&db, dir.path());

    migrator.run().await.unwrap();
    db.clear_calls();

    let summary = migrator.run().await.unwrap();
    assert_eq!(summary.starting_version, 2);
    assert_eq!(summary.final_version, 2);
    assert!(summary.applied.is_empty());
    assert_eq!(summary.skipped, 2);

    // only the idempotent ledger DDL ran
    assert!(db
        .executed()
        .iter()
        .all(|sql| sql.contains("IF NOT EXISTS")));
    assert_eq!(db.param_executions(), 0);
}

#[tokio::test]
async fn test_custom_ledger_table() {
    let dir = tempfile::tempdir().unwrap();
    write_script(dir.path(), "a__1.sql", "CREATE TABLE t (id INTEGER)");
    let db = DuckDbBackend::in_memory().unwrap();

    Migrator::new(&db, dir.path())
        .with_ledger_table("schema_history")
        .run()
        .await
        .unwrap();

    assert!(table_exists(&db, "schema_history").await);
    assert!(!table_exists(&db, "dbmigrator_versioning").await);
}

#[tokio::test]
async fn test_from_config() {
    let root = tempfile::tempdir().unwrap();
    write_script(&root.path().join("sql"), "a__1.sql", "CREATE TABLE t (id INTEGER)");
    let mut config = Config::default();
    config.migrations_path = "sql".to_string();
    config.ledger.table = "versions".to_string();
    config.statement_splitting = SplitStrategy::Tokenized;

    let db = DuckDbBackend::in_memory().unwrap();
    let migrator = Migrator::from_config(&db, &config, root.path());
    assert_eq!(migrator.migrations_dir(), root.path().join("sql"));
    assert_eq!(migrator.ledger().sql().table(), "versions");

    let summary = migrator.run().await.unwrap();
    assert_eq!(summary.final_version, 1);
}

#[tokio::test]
async fn test_malformed_filename_aborts_before_any_migration() {
    let dir = tempfile::tempdir().unwrap();
    write_two_scripts(dir.path());
    write_script(dir.path(), "notes.txt", "not a migration");
    let db = RecordingDatabase::in_memory();

    let err = Migrator::new(&db, dir.path()).run().await.unwrap_err();

    assert!(matches!(err, MigrateError::Scan(_)));
    assert!(!db.executed().iter().any(|sql| sql.contains("dbmigrator_testone")));
    assert_eq!(Ledger::default().current_version(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_duplicate_versions_rejected_by_default() {
    let dir = tempfile::tempdir().unwrap();
    write_script(dir.path(), "a__1.sql", "CREATE TABLE a (id INTEGER)");
    write_script(dir.path(), "b__1.sql", "CREATE TABLE b (id INTEGER)");
    let db = DuckDbBackend::in_memory().unwrap();

    let err = Migrator::new(&db, dir.path()).run().await.unwrap_err();
    assert!(matches!(err, MigrateError::Scan(_)));
}

#[tokio::test]
async fn test_duplicate_versions_last_wins() {
    let dir = tempfile::tempdir().unwrap();
    write_script(dir.path(), "a__1.sql", "CREATE TABLE a (id INTEGER)");
    write_script(dir.path(), "b__1.sql", "CREATE TABLE b (id INTEGER)");
    let db = DuckDbBackend::in_memory().unwrap();

    Migrator::new(&db, dir.path())
        .with_duplicate_policy(DuplicatePolicy::LastWins)
        .run()
        .await
        .unwrap();

    assert!(table_exists(&db, "b").await);
    assert!(!table_exists(&db, "a").await);
}

#[tokio::test]
async fn test_missing_directory_is_scan_error() {
    let dir = tempfile::tempdir().unwrap();
    let db = DuckDbBackend::in_memory().unwrap();

    let err = Migrator::new(&db, dir.path().join("absent"))
        .run()
        .await
        .unwrap_err();
    assert!(matches!(err, MigrateError::Scan(_)));
}

#[tokio::test]
async fn test_plan_lists_pending_without_executing() {
    let dir = tempfile::tempdir().unwrap();
    write_two_scripts(dir.path());
    let db = RecordingDatabase::in_memory();
    let migrator = Migrator::new(&db, dir.path());

    let plan = migrator.plan().await.unwrap();
    assert_eq!(plan.current_version, 0);
    assert_eq!(plan.discovered, 2);
    assert_eq!(
        plan.pending.iter().map(|u| u.version).collect::<Vec<_>>(),
        vec![1, 2]
    );
    assert!(!db.executed().iter().any(|sql| sql.contains("dbmigrator_testone")));
}

#[tokio::test]
async fn test_plan_after_partial_run() {
    let dir = tempfile::tempdir().unwrap();
    write_script(dir.path(), "a__1.sql", "CREATE TABLE a (id INTEGER)");
    let db = DuckDbBackend::in_memory().unwrap();
    let migrator = Migrator::new(&db, dir.path());
    migrator.run().await.unwrap();

    write_script(dir.path(), "b__2.sql", "CREATE TABLE b (id INTEGER)");
    let plan = migrator.plan().await.unwrap();

    assert_eq!(plan.current_version, 1);
    assert_eq!(plan.pending.len(), 1);
    assert_eq!(plan.pending[0].version, 2);
}

#[tokio::test]
async fn test_history_after_run() {
    let dir = tempfile::tempdir().unwrap();
    write_two_scripts(dir.path());
    let db = DuckDbBackend::in_memory().unwrap();
    let migrator = Migrator::new(&db, dir.path()).with_clock(FixedClock(99));

    assert!(migrator.history().await.unwrap().is_empty());
    migrator.run().await.unwrap();

    let history = migrator.history().await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].version, 1);
    assert!(history[0].source_path.ends_with("Somesqlfile__1.sql"));
    assert_eq!(history[1].applied_at_millis, 99);
}

#[test]
fn test_validate_reports_parse_issues() {
    let dir = tempfile::tempdir().unwrap();
    write_script(dir.path(), "good__1.sql", "CREATE TABLE t (id INTEGER);");
    write_script(dir.path(), "bad__2.sql", "INSERT INTO t VALUES (1); SELEC * FROM t;");
    let db = DuckDbBackend::in_memory().unwrap();

    let results = Migrator::new(&db, dir.path()).validate().unwrap();

    assert_eq!(results.len(), 2);
    assert!(results[0].is_valid());
    assert_eq!(results[0].statement_count, 1);
    assert!(!results[1].is_valid());
    assert_eq!(results[1].statement_count, 2);
    assert_eq!(results[1].issues.len(), 1);
    assert!(results[1].issues[0].starts_with("statement 2"));
}

#[test]
fn test_validate_flags_naive_literal_split() {
    let dir = tempfile::tempdir().unwrap();
    write_script(dir.path(), "seed__1.sql", "INSERT INTO t VALUES ('a;b');");
    let db = DuckDbBackend::in_memory().unwrap();

    let naive = Migrator::new(&db, dir.path()).validate().unwrap();
    assert!(!naive[0].is_valid());

    let tokenized = Migrator::new(&db, dir.path())
        .with_split_strategy(SplitStrategy::Tokenized)
        .validate()
        .unwrap();
    assert!(tokenized[0].is_valid());
    assert_eq!(tokenized[0].statement_count, 1);
}
