//! dbm-sql - SQL layer for dbmigrator
//!
//! This crate splits migration scripts into individual statements and
//! validates statement syntax using sqlparser-rs with the DuckDB dialect.

pub mod dialect;
pub mod error;
pub mod splitter;
pub mod validator;

pub use dialect::{DuckDbDialect, SqlDialect};
pub use error::{SqlError, SqlResult};
pub use splitter::StatementSplitter;
pub use validator::{validate_statements, StatementIssue};
