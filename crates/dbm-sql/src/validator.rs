//! Statement syntax validation
//!
//! Parses each split statement with the dialect parser so that syntax errors
//! surface before any migration touches the database.

use crate::dialect::SqlDialect;
use crate::error::SqlError;

/// A statement that failed to parse
#[derive(Debug)]
pub struct StatementIssue {
    /// Zero-based position of the statement within its script
    pub index: usize,

    /// Statement text as it would be executed
    pub statement: String,

    /// Parse failure
    pub error: SqlError,
}

/// Parse every statement, returning the ones that fail
pub fn validate_statements(
    statements: &[String],
    dialect: &dyn SqlDialect,
) -> Vec<StatementIssue> {
    statements
        .iter()
        .enumerate()
        .filter_map(|(index, statement)| {
            dialect.parse(statement).err().map(|error| StatementIssue {
                index,
                statement: statement.clone(),
                error,
            })
        })
        .collect()
}

#[cfg(test)]
#[path = "validator_test.rs"]
mod tests;
