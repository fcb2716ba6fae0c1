//! # Expression Errors
//!
//! Error types for filter and pagination expression parsing.

use thiserror::Error;

/// Result type for expression parsing
pub type ExprResult<T> = Result<T, ParseError>;

/// Expression parsing errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A filter clause contains none of the recognized operators
    #[error("Filter clause '{clause}' on '{table}' has no recognized operator")]
    MissingOperator { table: String, clause: String },

    /// A filter clause has an operator but nothing to its left
    #[error("Filter clause '{clause}' on '{table}' has an empty field")]
    EmptyField { table: String, clause: String },

    /// `filter` or `pagination` was supplied as something other than text
    #[error("Argument '{0}' must be a string expression")]
    NotAString(String),
}

impl ParseError {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            ParseError::MissingOperator { .. } => "RELGRAPH_FILTER_MISSING_OPERATOR",
            ParseError::EmptyField { .. } => "RELGRAPH_FILTER_EMPTY_FIELD",
            ParseError::NotAString(_) => "RELGRAPH_ARGUMENT_NOT_A_STRING",
        }
    }
}
