//! Database trait definitions
//!
//! The migration engine treats the database as an opaque transactional SQL
//! executor. Transactions are connection-scoped: at most one is open at a
//! time, started with [`DatabaseTransaction::begin`] and closed by either
//! [`DatabaseTransaction::commit`] or [`DatabaseTransaction::rollback`].

use crate::error::DbResult;
use crate::value::{Row, SqlValue};
use async_trait::async_trait;

/// Statement execution and querying
#[async_trait]
pub trait DatabaseCore: Send + Sync {
    /// Execute a single SQL statement, returns affected rows
    async fn execute(&self, sql: &str) -> DbResult<usize>;

    /// Execute a single SQL statement with positional parameters
    async fn execute_params(&self, sql: &str, params: &[SqlValue]) -> DbResult<usize>;

    /// Run a query and return every row
    async fn query_rows(&self, sql: &str) -> DbResult<Vec<Row>>;
}

/// Transaction control
#[async_trait]
pub trait DatabaseTransaction: Send + Sync {
    /// Open a transaction
    async fn begin(&self) -> DbResult<()>;

    /// Commit the open transaction
    async fn commit(&self) -> DbResult<()>;

    /// Roll back the open transaction
    async fn rollback(&self) -> DbResult<()>;
}

/// A transactional SQL executor
pub trait Database: DatabaseCore + DatabaseTransaction {}

impl<T: DatabaseCore + DatabaseTransaction + ?Sized> Database for T {}
