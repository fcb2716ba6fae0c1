//! # Common Argument Parsing
//!
//! Turns raw resolver arguments into [`ParsedArgs`]: the `filter` and
//! `pagination` strings are parsed, every other key passes through.

use serde::Serialize;
use serde_json::{Map, Value};

use super::errors::{ExprResult, ParseError};
use super::filter::{parse_filter_expression, FilterCondition};
use super::pagination::{parse_pagination_expression, PaginationSpec};

/// Raw field arguments as received from the execution engine
pub type Args = Map<String, Value>;

/// Field arguments with `filter`/`pagination` parsed
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParsedArgs {
    /// Table the arguments target
    pub table: String,

    /// Parsed `filter`, if supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterCondition>,

    /// Parsed `pagination`, if supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationSpec>,

    /// Every other argument, unchanged
    #[serde(flatten)]
    pub rest: Args,
}

impl ParsedArgs {
    /// Arguments carrying only a filter
    pub fn with_filter(table: impl Into<String>, filter: FilterCondition) -> Self {
        Self {
            table: table.into(),
            filter: Some(filter),
            ..Default::default()
        }
    }

    /// Look up a pass-through argument
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.rest.get(key)
    }

    /// The `input` object of a mutation
    pub fn input(&self) -> Option<&Map<String, Value>> {
        self.rest.get("input").and_then(Value::as_object)
    }

    /// The raw `where` condition, if supplied
    pub fn where_condition(&self) -> Option<&Value> {
        self.rest.get("where").filter(|v| !v.is_null())
    }

    /// Whether `_debug` was requested
    pub fn debug(&self) -> bool {
        self.flag("_debug")
    }

    /// Whether `_cache` was requested
    pub fn cache(&self) -> bool {
        self.flag("_cache")
    }

    fn flag(&self, key: &str) -> bool {
        self.rest.get(key).and_then(Value::as_bool).unwrap_or(false)
    }
}

/// Parse the common `filter`/`pagination` arguments for `table`
pub fn parse_args_common(table: &str, args: &Args) -> ExprResult<ParsedArgs> {
    let mut parsed = ParsedArgs {
        table: table.to_string(),
        ..Default::default()
    };

    for (key, value) in args {
        match key.as_str() {
            "filter" => {
                if let Some(expr) = expression_text(key, value)? {
                    parsed.filter = Some(parse_filter_expression(expr, table)?);
                }
            }
            "pagination" => {
                if let Some(expr) = expression_text(key, value)? {
                    parsed.pagination = Some(parse_pagination_expression(expr, table));
                }
            }
            _ => {
                parsed.rest.insert(key.clone(), value.clone());
            }
        }
    }

    Ok(parsed)
}

/// Null means "not supplied"; any other non-string is an error
fn expression_text<'a>(key: &str, value: &'a Value) -> ExprResult<Option<&'a str>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.as_str())),
        _ => Err(ParseError::NotAString(key.to_string())),
    }
}
