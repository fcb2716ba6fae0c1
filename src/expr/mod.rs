//! # Expression Parser
//!
//! Filter and pagination text parsing shared by every generated resolver.

pub mod args;
pub mod errors;
pub mod filter;
pub mod pagination;

pub use args::{parse_args_common, Args, ParsedArgs};
pub use errors::{ExprResult, ParseError};
pub use filter::{
    parse_filter_expression, value_literal, FilterClause, FilterCondition, FilterOperator,
    OPERATOR_PRIORITY,
};
pub use pagination::{parse_pagination_expression, OrderBy, PaginationSpec};
