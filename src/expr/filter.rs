//! # Filter Expressions
//!
//! Parses `field<op>value(;field<op>value)*` text into typed clauses.
//!
//! Operator recognition is a leftmost-starting scan over a fixed priority
//! list: the operator whose match starts earliest in the clause wins, and
//! operators starting at the same position are ranked by [`OPERATOR_PRIORITY`].
//! Downstream predicate translation relies on exactly one canonical operator
//! per clause, so the list order must not change.

use std::cmp::Ordering;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use super::errors::{ExprResult, ParseError};

/// Filter operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOperator {
    /// Null-safe equality
    #[serde(rename = "<=>")]
    NullSafeEq,

    /// Greater than or equal
    #[serde(rename = ">=")]
    Gte,

    /// Less than or equal
    #[serde(rename = "<=")]
    Lte,

    /// Equals
    #[serde(rename = "=")]
    Eq,

    /// Greater than
    #[serde(rename = ">")]
    Gt,

    /// Less than
    #[serde(rename = "<")]
    Lt,

    /// Case-insensitive partial match
    #[serde(rename = "~")]
    Like,

    /// Set membership, value is a comma-separated list
    #[serde(rename = "#")]
    In,
}

/// Recognition order for filter operators.
pub const OPERATOR_PRIORITY: [FilterOperator; 8] = [
    FilterOperator::NullSafeEq,
    FilterOperator::Gte,
    FilterOperator::Lte,
    FilterOperator::Eq,
    FilterOperator::Gt,
    FilterOperator::Lt,
    FilterOperator::Like,
    FilterOperator::In,
];

impl FilterOperator {
    /// Get the operator symbol
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::NullSafeEq => "<=>",
            FilterOperator::Gte => ">=",
            FilterOperator::Lte => "<=",
            FilterOperator::Eq => "=",
            FilterOperator::Gt => ">",
            FilterOperator::Lt => "<",
            FilterOperator::Like => "~",
            FilterOperator::In => "#",
        }
    }

    /// Look up an operator by its symbol
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        OPERATOR_PRIORITY.into_iter().find(|op| op.as_str() == symbol)
    }

    /// Find the operator that governs `clause` and its byte offset
    pub fn locate(clause: &str) -> Option<(FilterOperator, usize)> {
        let mut found: Option<(FilterOperator, usize)> = None;
        for op in OPERATOR_PRIORITY {
            if let Some(pos) = clause.find(op.as_str()) {
                match found {
                    Some((_, best)) if best <= pos => {}
                    _ => found = Some((op, pos)),
                }
            }
        }
        found
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `field<op>value` predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterClause {
    /// Comparison operator
    pub operator: FilterOperator,

    /// Field to filter on
    pub field: String,

    /// Raw value text, uninterpreted except for `#` lists
    pub value: String,
}

impl FilterClause {
    /// Create a new clause
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: impl Into<String>) -> Self {
        Self {
            operator,
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create an equality clause
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::Eq, value)
    }

    /// Create a set-membership clause
    pub fn in_set(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::In, value)
    }

    /// Parse a single clause
    pub fn parse(clause: &str, table: &str) -> ExprResult<Self> {
        let (operator, pos) =
            FilterOperator::locate(clause).ok_or_else(|| ParseError::MissingOperator {
                table: table.to_string(),
                clause: clause.to_string(),
            })?;

        let field = clause[..pos].trim();
        if field.is_empty() {
            return Err(ParseError::EmptyField {
                table: table.to_string(),
                clause: clause.to_string(),
            });
        }
        let value = clause[pos + operator.as_str().len()..].trim();

        Ok(Self::new(field, operator, value))
    }

    /// Values this clause compares against (split on `,` for `#`)
    pub fn values(&self) -> Vec<&str> {
        match self.operator {
            FilterOperator::In => self.value.split(',').map(str::trim).collect(),
            _ => vec![self.value.as_str()],
        }
    }

    /// Check if a record matches this clause
    pub fn matches(&self, record: &Value) -> bool {
        let field_value = record.get(&self.field).filter(|v| !v.is_null());

        match self.operator {
            FilterOperator::NullSafeEq => match field_value {
                None => self.value.eq_ignore_ascii_case("null"),
                Some(v) => compare_literal(v, &self.value) == Some(Ordering::Equal),
            },
            FilterOperator::Eq => {
                field_value.and_then(|v| compare_literal(v, &self.value)) == Some(Ordering::Equal)
            }
            FilterOperator::Gt => {
                field_value.and_then(|v| compare_literal(v, &self.value)) == Some(Ordering::Greater)
            }
            FilterOperator::Gte => matches!(
                field_value.and_then(|v| compare_literal(v, &self.value)),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            FilterOperator::Lt => {
                field_value.and_then(|v| compare_literal(v, &self.value)) == Some(Ordering::Less)
            }
            FilterOperator::Lte => matches!(
                field_value.and_then(|v| compare_literal(v, &self.value)),
                Some(Ordering::Less | Ordering::Equal)
            ),
            FilterOperator::Like => field_value
                .and_then(value_literal)
                .map(|s| s.to_lowercase().contains(&self.value.to_lowercase()))
                .unwrap_or(false),
            FilterOperator::In => match field_value {
                Some(v) => self
                    .values()
                    .iter()
                    .any(|candidate| compare_literal(v, candidate) == Some(Ordering::Equal)),
                None => false,
            },
        }
    }
}

impl fmt::Display for FilterClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.field, self.operator, self.value)
    }
}

impl Serialize for FilterClause {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.operator, &self.field, &self.value).serialize(serializer)
    }
}

/// AND-combined clauses scoped to one table
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterCondition {
    /// Table the clauses apply to
    pub table: String,

    /// Clauses in expression order
    pub clauses: Vec<FilterClause>,
}

impl FilterCondition {
    /// Create an empty condition for a table
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            clauses: Vec::new(),
        }
    }

    /// Append a clause
    pub fn and(mut self, clause: FilterClause) -> Self {
        self.clauses.push(clause);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Check if a record matches all clauses
    pub fn matches(&self, record: &Value) -> bool {
        self.clauses.iter().all(|c| c.matches(record))
    }

    /// Render back to expression text
    pub fn to_expression(&self) -> String {
        self.clauses
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(";")
    }
}

impl Serialize for FilterCondition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.table, &self.clauses)?;
        map.end()
    }
}

/// Parse a filter expression for `table`
pub fn parse_filter_expression(expr: &str, table: &str) -> ExprResult<FilterCondition> {
    let mut condition = FilterCondition::new(table);
    for clause in expr.split(';') {
        if clause.trim().is_empty() {
            continue;
        }
        condition.clauses.push(FilterClause::parse(clause, table)?);
    }
    Ok(condition)
}

/// Text form of a scalar JSON value, `None` for null
pub fn value_literal(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// Compare a record value against literal text
fn compare_literal(value: &Value, literal: &str) -> Option<Ordering> {
    match value {
        Value::Number(n) => {
            let a = n.as_f64()?;
            let b: f64 = literal.parse().ok()?;
            a.partial_cmp(&b)
        }
        Value::String(s) => Some(s.as_str().cmp(literal)),
        Value::Bool(b) => literal.parse::<bool>().ok().map(|l| b.cmp(&l)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_two_clauses() {
        let cond = parse_filter_expression("a=1;b#2,3", "t").unwrap();
        assert_eq!(cond.table, "t");
        assert_eq!(
            cond.clauses,
            vec![
                FilterClause::new("a", FilterOperator::Eq, "1"),
                FilterClause::new("b", FilterOperator::In, "2,3"),
            ]
        );
    }

    #[test]
    fn test_tokens_are_trimmed() {
        let cond = parse_filter_expression("  name ~  ali ; age >= 18 ", "users").unwrap();
        assert_eq!(cond.clauses[0], FilterClause::new("name", FilterOperator::Like, "ali"));
        assert_eq!(cond.clauses[1], FilterClause::new("age", FilterOperator::Gte, "18"));
    }

    #[test]
    fn test_operator_priority() {
        assert_eq!(FilterOperator::locate("a<=>b"), Some((FilterOperator::NullSafeEq, 1)));
        assert_eq!(FilterOperator::locate("a>=1"), Some((FilterOperator::Gte, 1)));
        assert_eq!(FilterOperator::locate("a<=1"), Some((FilterOperator::Lte, 1)));
        assert_eq!(FilterOperator::locate("a<1"), Some((FilterOperator::Lt, 1)));
    }

    #[test]
    fn test_leftmost_operator_wins() {
        // The value contains '>' but '=' starts earlier
        let clause = FilterClause::parse("x=a>b", "t").unwrap();
        assert_eq!(clause.operator, FilterOperator::Eq);
        assert_eq!(clause.value, "a>b");

        let clause = FilterClause::parse("tags#a=b", "t").unwrap();
        assert_eq!(clause.operator, FilterOperator::In);
        assert_eq!(clause.value, "a=b");
    }

    #[test]
    fn test_missing_operator() {
        let err = parse_filter_expression("a=1;broken", "t").unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingOperator {
                table: "t".to_string(),
                clause: "broken".to_string(),
            }
        );
    }

    #[test]
    fn test_empty_field() {
        assert!(matches!(
            parse_filter_expression("=1", "t"),
            Err(ParseError::EmptyField { .. })
        ));
    }

    #[test]
    fn test_trailing_separator_skipped() {
        let cond = parse_filter_expression("a=1;", "t").unwrap();
        assert_eq!(cond.len(), 1);
    }

    #[test]
    fn test_serialized_shape() {
        let cond = parse_filter_expression("a=1;b#2,3", "foo").unwrap();
        assert_eq!(
            serde_json::to_value(&cond).unwrap(),
            json!({"foo": [["=", "a", "1"], ["#", "b", "2,3"]]})
        );
    }

    #[test]
    fn test_to_expression() {
        let cond = FilterCondition::new("t")
            .and(FilterClause::eq("a", "1"))
            .and(FilterClause::in_set("id", "4"));
        assert_eq!(cond.to_expression(), "a=1;id#4");
    }

    #[test]
    fn test_in_matches() {
        let clause = FilterClause::in_set("status", "active, pending");
        assert!(clause.matches(&json!({"status": "active"})));
        assert!(clause.matches(&json!({"status": "pending"})));
        assert!(!clause.matches(&json!({"status": "done"})));

        let numeric = FilterClause::in_set("id", "1,2");
        assert!(numeric.matches(&json!({"id": 2})));
        assert!(!numeric.matches(&json!({"id": 3})));
    }

    #[test]
    fn test_like_is_case_insensitive() {
        let clause = FilterClause::new("name", FilterOperator::Like, "SON");
        assert!(clause.matches(&json!({"name": "Johnson"})));
        assert!(!clause.matches(&json!({"name": "Smith"})));
    }

    #[test]
    fn test_comparisons() {
        let record = json!({"age": 21, "name": "bob"});
        assert!(FilterClause::new("age", FilterOperator::Gt, "18").matches(&record));
        assert!(FilterClause::new("age", FilterOperator::Gte, "21").matches(&record));
        assert!(!FilterClause::new("age", FilterOperator::Lt, "21").matches(&record));
        assert!(FilterClause::new("age", FilterOperator::Lte, "21").matches(&record));
        assert!(FilterClause::eq("name", "bob").matches(&record));
        assert!(!FilterClause::eq("missing", "bob").matches(&record));
    }

    #[test]
    fn test_null_safe_eq() {
        let clause = FilterClause::new("parent", FilterOperator::NullSafeEq, "NULL");
        assert!(clause.matches(&json!({"parent": null})));
        assert!(clause.matches(&json!({})));
        assert!(!clause.matches(&json!({"parent": 3})));
    }

    #[test]
    fn test_boolean_ordering() {
        let yes = json!({"flag": true});
        let no = json!({"flag": false});
        assert!(!FilterClause::new("flag", FilterOperator::Lt, "false").matches(&yes));
        assert!(FilterClause::new("flag", FilterOperator::Gt, "false").matches(&yes));
        assert!(FilterClause::new("flag", FilterOperator::Lt, "true").matches(&no));
        assert!(!FilterClause::new("flag", FilterOperator::Gt, "true").matches(&no));
        assert!(FilterClause::eq("flag", "true").matches(&yes));
        assert!(!FilterClause::eq("flag", "yes").matches(&yes));
    }
}
