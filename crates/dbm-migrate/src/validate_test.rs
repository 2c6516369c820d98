use super::*;
use crate::test_utils::write_script;

#[test]
fn test_validate_scripts_without_database() {
    let dir = tempfile::tempdir().unwrap();
    write_script(dir.path(), "a__1.sql", "CREATE TABLE t (id INTEGER);\n-- end\n");
    write_script(dir.path(), "b__2.sql", "INSERT INTO t VALUES (1);");

    let results =
        validate_scripts(dir.path(), DuplicatePolicy::Error, &StatementSplitter::naive()).unwrap();

    assert_eq!(results.len(), 2);
    assert!(results.iter().all(FileValidation::is_valid));
    assert_eq!(results[0].statement_count, 1);
}

#[test]
fn test_split_failure_is_reported_per_file() {
    let dir = tempfile::tempdir().unwrap();
    write_script(dir.path(), "a__1.sql", "SELECT 'unterminated");
    write_script(dir.path(), "b__2.sql", "SELECT 1;");

    let results = validate_scripts(
        dir.path(),
        DuplicatePolicy::Error,
        &StatementSplitter::tokenized(),
    )
    .unwrap();

    assert!(!results[0].is_valid());
    assert_eq!(results[0].statement_count, 0);
    assert!(results[1].is_valid());
}

#[test]
fn test_duplicate_versions_fail_validation() {
    let dir = tempfile::tempdir().unwrap();
    write_script(dir.path(), "a__1.sql", "SELECT 1;");
    write_script(dir.path(), "b__1.sql", "SELECT 2;");

    let err = validate_scripts(dir.path(), DuplicatePolicy::Error, &StatementSplitter::naive())
        .unwrap_err();
    assert!(matches!(err, MigrateError::Scan(_)));
}
