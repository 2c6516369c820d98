//! dbm-db - Database abstraction layer for dbmigrator
//!
//! This crate provides the transactional executor traits the migration
//! engine runs against, and their DuckDB implementation.

pub mod duckdb;
pub mod error;
pub mod traits;
pub mod value;

pub use duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use traits::{Database, DatabaseCore, DatabaseTransaction};
pub use value::{Row, SqlValue};
