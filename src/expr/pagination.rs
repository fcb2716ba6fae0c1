//! # Pagination Expressions
//!
//! Parses `key=value(;key=value)*` text. Keys are not validated here;
//! `limit`, `offset` and `orderby` are conventions the driver interprets.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Ordered pagination entries for one table
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PaginationSpec {
    /// Table the entries apply to
    pub table: String,

    /// `(key, value)` pairs in expression order
    pub entries: Vec<(String, String)>,
}

/// Sort direction parsed from an `orderby` value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub ascending: bool,
}

impl PaginationSpec {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            entries: Vec::new(),
        }
    }

    /// First value stored under `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Replace the value under `key`, or append it
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// `limit`, if present and numeric
    pub fn limit(&self) -> Option<usize> {
        self.get("limit").and_then(|v| v.parse().ok())
    }

    /// `offset`, if present and numeric
    pub fn offset(&self) -> Option<usize> {
        self.get("offset").and_then(|v| v.parse().ok())
    }

    /// `orderby` as `field` or `field asc|desc`
    pub fn order_by(&self) -> Option<OrderBy> {
        let raw = self.get("orderby")?;
        let mut parts = raw.split_whitespace();
        let field = parts.next()?.to_string();
        let ascending = !matches!(
            parts.next().map(|d| d.to_ascii_lowercase()).as_deref(),
            Some("desc")
        );
        Some(OrderBy { field, ascending })
    }
}

impl Serialize for PaginationSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.table, &self.entries)?;
        map.end()
    }
}

/// Parse a pagination expression for `table`
pub fn parse_pagination_expression(expr: &str, table: &str) -> PaginationSpec {
    let mut spec = PaginationSpec::new(table);
    for segment in expr.split(';') {
        if segment.trim().is_empty() {
            continue;
        }
        let (key, value) = match segment.split_once('=') {
            Some((k, v)) => (k.trim(), v.trim()),
            None => (segment.trim(), ""),
        };
        spec.entries.push((key.to_string(), value.to_string()));
    }
    spec
}
