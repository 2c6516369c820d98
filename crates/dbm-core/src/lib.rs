//! dbm-core - Core library for dbmigrator
//!
//! This crate provides the project configuration, the migration-unit model,
//! filename decoding, and the script repository scanner shared by the
//! other dbmigrator crates.

pub mod config;
pub mod error;
pub mod migration;
pub mod scanner;

pub use config::{Config, DatabaseConfig, DbType, DuplicatePolicy, LedgerConfig, SplitStrategy};
pub use error::{CoreError, CoreResult};
pub use migration::{parse_version, MigrationSet, MigrationUnit};
pub use scanner::scan_directory;
