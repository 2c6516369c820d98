//! Error types for dbm-core

use thiserror::Error;

/// Core error type for dbmigrator
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Failed to parse configuration file
    #[error("[E002] Failed to parse config {path}: {message}")]
    ConfigParseError { path: String, message: String },

    /// E003: Invalid configuration value
    #[error("[E003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E101: Migration file name does not carry a decodable version
    #[error("[E101] Malformed migration filename '{path}': {reason}")]
    MalformedFilename { path: String, reason: String },

    /// E102: Directory traversal failed
    #[error("[E102] Failed to scan migration directory '{path}': {message}")]
    DirectoryScan { path: String, message: String },

    /// E103: Two files decode to the same version
    #[error("[E103] Duplicate migration version {version}: '{first}' and '{second}'")]
    DuplicateVersion {
        version: i64,
        first: String,
        second: String,
    },

    /// E014: IO error
    #[error("[E014] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// E016: IO error with file path context
    #[error("[E016] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
