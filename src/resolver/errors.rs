//! # Resolver Errors
//!
//! Error types for resolver registration and invocation. Parse and driver
//! errors pass through unchanged.

use thiserror::Error;

use crate::driver::DriverError;
use crate::expr::ParseError;

/// Result type for resolver operations
pub type ResolverResult<T> = Result<T, ResolverError>;

/// Resolver errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolverError {
    /// Filter or pagination argument could not be parsed
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Error raised by the database collaborator
    #[error(transparent)]
    Driver(#[from] DriverError),

    /// Strict registration found an existing resolver
    #[error("Resolver already registered for {namespace}.{field}")]
    DuplicateResolver { namespace: String, field: String },

    /// Resolver key names nothing in the schema
    #[error("Resolver {namespace}.{field} does not match any schema field")]
    UnknownField { namespace: String, field: String },

    /// No resolver registered under the key
    #[error("No resolver registered for {namespace}.{field}")]
    NotFound { namespace: String, field: String },

    /// Missing or malformed argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Raised by an authorizer that rejects with an error
    #[error("Access denied: {0}")]
    Rejected(String),
}

impl ResolverError {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            ResolverError::Parse(e) => e.code(),
            ResolverError::Driver(e) => e.code(),
            ResolverError::DuplicateResolver { .. } => "RELGRAPH_DUPLICATE_RESOLVER",
            ResolverError::UnknownField { .. } => "RELGRAPH_UNKNOWN_FIELD",
            ResolverError::NotFound { .. } => "RELGRAPH_RESOLVER_NOT_FOUND",
            ResolverError::InvalidArgument(_) => "RELGRAPH_INVALID_ARGUMENT",
            ResolverError::Rejected(_) => "RELGRAPH_REJECTED",
        }
    }
}
