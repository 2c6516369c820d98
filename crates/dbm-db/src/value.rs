//! Backend-neutral SQL values

use crate::error::{DbError, DbResult};

/// A single SQL parameter or result cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Text(String),
}

/// One result row
pub type Row = Vec<SqlValue>;

impl SqlValue {
    /// Read an integer cell at `column`
    pub fn as_i64(&self, column: usize) -> DbResult<i64> {
        match self {
            SqlValue::Integer(v) => Ok(*v),
            other => Err(DbError::TypeMismatch {
                column,
                expected: "integer",
                found: other.type_name().to_string(),
            }),
        }
    }

    /// Read a text cell at `column`
    pub fn as_str(&self, column: usize) -> DbResult<&str> {
        match self {
            SqlValue::Text(v) => Ok(v),
            other => Err(DbError::TypeMismatch {
                column,
                expected: "text",
                found: other.type_name().to_string(),
            }),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            SqlValue::Null => "null",
            SqlValue::Integer(_) => "integer",
            SqlValue::Text(_) => "text",
        }
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Integer(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}
