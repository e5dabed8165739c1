//! Error types for the dump conversion engine.

use thiserror::Error;

/// Errors raised while translating a dump.
#[derive(Error, Debug)]
pub enum DumpError {
    /// A line did not have the shape its statement kind requires
    #[error("Malformed statement at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    /// INSERT for a table whose CREATE TABLE was never seen
    #[error("No column types recorded for table {0} - missing CREATE TABLE?")]
    UnknownTable(String),

    /// Invalid dialect configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DumpError {
    /// Create a Malformed error for the given 1-based line number
    pub fn malformed(line: usize, reason: impl Into<String>) -> Self {
        DumpError::Malformed {
            line,
            reason: reason.into(),
        }
    }
}

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, DumpError>;
