//! # Driver Errors
//!
//! Errors raised by the database collaborator. The core never catches
//! these except for per-column type mapping failures.

use thiserror::Error;

/// Result type for driver operations
pub type DriverResult<T> = Result<T, DriverError>;

/// Driver errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    /// Table is not known to the driver
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    /// Column is not known to the driver
    #[error("Unknown column '{column}' on table '{table}'")]
    UnknownColumn { table: String, column: String },

    /// Native column type has no scalar mapping
    #[error("Column '{column}' has unsupported type '{native_type}'")]
    UnsupportedType { column: String, native_type: String },

    /// Table has no primary key
    #[error("Table '{0}' has no primary key")]
    MissingPrimaryKey(String),

    /// Constraint violation reported by the store
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// Connection failure
    #[error("Connection error: {0}")]
    Connection(String),

    /// Internal driver error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DriverError {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            DriverError::UnknownTable(_) => "RELGRAPH_DRIVER_UNKNOWN_TABLE",
            DriverError::UnknownColumn { .. } => "RELGRAPH_DRIVER_UNKNOWN_COLUMN",
            DriverError::UnsupportedType { .. } => "RELGRAPH_DRIVER_UNSUPPORTED_TYPE",
            DriverError::MissingPrimaryKey(_) => "RELGRAPH_DRIVER_MISSING_PRIMARY_KEY",
            DriverError::Constraint(_) => "RELGRAPH_DRIVER_CONSTRAINT",
            DriverError::Connection(_) => "RELGRAPH_DRIVER_CONNECTION",
            DriverError::Internal(_) => "RELGRAPH_DRIVER_INTERNAL",
        }
    }
}
