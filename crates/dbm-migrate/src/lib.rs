//! dbm-migrate - Migration engine for dbmigrator
//!
//! Applies an ordered sequence of versioned SQL scripts exactly once each:
//!
//! - [`ledger`]: the versioning table recording every applied version
//! - [`engine`]: the apply loop, one transaction per migration unit
//! - [`orchestrator`]: sequences ledger setup, version lookup, discovery
//!   and the apply loop for a single run
//! - [`validate`]: offline split and parse checks for every script

pub mod clock;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod orchestrator;
pub mod validate;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;

pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::{AppliedMigration, ApplyReport, MigrationEngine};
pub use error::{MigrateError, MigrateResult};
pub use ledger::{Ledger, LedgerRecord, LedgerSql};
pub use orchestrator::{MigrationPlan, Migrator, RunSummary};
pub use validate::{validate_scripts, FileValidation};
