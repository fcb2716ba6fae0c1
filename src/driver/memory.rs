//! # In-Memory Driver
//!
//! A [`Driver`] backed by in-process tables. Filters are evaluated with
//! [`FilterCondition::matches`](crate::expr::FilterCondition::matches);
//! `where` conditions are raw SQL and are ignored. Every data call is
//! recorded so callers can assert on what was fetched.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use serde_json::{Map, Value};

use super::errors::{DriverError, DriverResult};
use super::metadata::{ColumnMeta, TableMetadata};
use super::{Driver, DriverFuture};
use crate::expr::ParsedArgs;

/// Kind of data call made against the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverOp {
    Page,
    PageTotal,
    FirstOf,
    PutItem,
}

/// A recorded data call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverCall {
    pub op: DriverOp,
    pub table: String,
    /// Filter rendered back to expression text
    pub filter: Option<String>,
}

/// In-memory driver
pub struct InMemoryDriver {
    /// Table metadata in registration order
    tables: Vec<TableMetadata>,

    /// Primary key column per table
    primary_keys: HashMap<String, String>,

    /// Native type -> scalar type name
    type_map: HashMap<String, String>,

    /// Rows per table
    data: RwLock<HashMap<String, Vec<Value>>>,

    /// Call log
    calls: Mutex<Vec<DriverCall>>,
}

impl Default for InMemoryDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDriver {
    /// Create an empty driver with the default type mapping
    pub fn new() -> Self {
        let mut type_map = HashMap::new();
        for native in ["serial", "bigserial", "integer", "int", "int4", "int8", "bigint", "smallint"] {
            type_map.insert(native.to_string(), "Int".to_string());
        }
        for native in ["boolean", "bool"] {
            type_map.insert(native.to_string(), "Boolean".to_string());
        }
        for native in ["text", "varchar", "character varying", "char", "uuid", "date", "timestamp"] {
            type_map.insert(native.to_string(), "String".to_string());
        }
        for native in ["real", "float", "float4", "float8", "double precision", "numeric"] {
            type_map.insert(native.to_string(), "Float".to_string());
        }

        Self {
            tables: Vec::new(),
            primary_keys: HashMap::new(),
            type_map,
            data: RwLock::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Register a table
    pub fn with_table(mut self, meta: TableMetadata, primary_key: impl Into<String>) -> Self {
        self.primary_keys.insert(meta.name.clone(), primary_key.into());
        self.tables.retain(|t| t.name != meta.name);
        self.tables.push(meta);
        self
    }

    /// Map an additional native type
    pub fn with_type_mapping(mut self, native: impl Into<String>, scalar: impl Into<String>) -> Self {
        self.type_map.insert(native.into().to_lowercase(), scalar.into());
        self
    }

    /// Seed rows for a table
    pub fn with_rows(self, table: &str, rows: Vec<Value>) -> Self {
        if let Ok(mut data) = self.data.write() {
            data.entry(table.to_string()).or_default().extend(rows);
        }
        self
    }

    /// Snapshot of the call log
    pub fn calls(&self) -> Vec<DriverCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Number of data calls made so far
    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn clear_calls(&self) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.clear();
        }
    }

    /// Current rows of a table
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.data
            .read()
            .ok()
            .and_then(|d| d.get(table).cloned())
            .unwrap_or_default()
    }

    fn meta(&self, table: &str) -> DriverResult<&TableMetadata> {
        self.tables
            .iter()
            .find(|t| t.name == table)
            .ok_or_else(|| DriverError::UnknownTable(table.to_string()))
    }

    fn record(&self, op: DriverOp, table: &str, args: Option<&ParsedArgs>) {
        let filter = args
            .and_then(|a| a.filter.as_ref())
            .map(|f| f.to_expression());
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(DriverCall {
                op,
                table: table.to_string(),
                filter,
            });
        }
    }

    /// Filtered and ordered rows, before offset/limit
    fn select(&self, table: &str, args: &ParsedArgs) -> DriverResult<Vec<Value>> {
        self.meta(table)?;
        let data = self
            .data
            .read()
            .map_err(|_| DriverError::Internal("Lock poisoned".to_string()))?;

        let mut rows: Vec<Value> = data.get(table).cloned().unwrap_or_default();
        if let Some(filter) = &args.filter {
            rows.retain(|r| filter.matches(r));
        }

        if let Some(order) = args.pagination.as_ref().and_then(|p| p.order_by()) {
            rows.sort_by(|a, b| {
                let cmp = compare_json_values(a.get(&order.field), b.get(&order.field));
                if order.ascending {
                    cmp
                } else {
                    cmp.reverse()
                }
            });
        }

        Ok(rows)
    }
}

impl Driver for InMemoryDriver {
    fn tables(&self) -> Vec<String> {
        self.tables.iter().map(|t| t.name.clone()).collect()
    }

    fn table_metadata(&self, table: &str) -> DriverResult<TableMetadata> {
        self.meta(table).cloned()
    }

    fn map_column_type(&self, column: &ColumnMeta) -> DriverResult<String> {
        let native = column.native_type.to_lowercase();
        // "character varying(255)" -> "character varying"
        let base = native.split('(').next().unwrap_or_default().trim();
        self.type_map
            .get(base)
            .cloned()
            .ok_or_else(|| DriverError::UnsupportedType {
                column: column.name.clone(),
                native_type: column.native_type.clone(),
            })
    }

    fn primary_key(&self, table: &str) -> DriverResult<String> {
        self.meta(table)?;
        self.primary_keys
            .get(table)
            .cloned()
            .ok_or_else(|| DriverError::MissingPrimaryKey(table.to_string()))
    }

    fn page<'a>(&'a self, table: &'a str, args: &'a ParsedArgs) -> DriverFuture<'a, Vec<Value>> {
        Box::pin(async move {
            self.record(DriverOp::Page, table, Some(args));
            let rows = self.select(table, args)?;
            let pagination = args.pagination.as_ref();
            let offset = pagination.and_then(|p| p.offset()).unwrap_or(0);
            let limit = pagination.and_then(|p| p.limit()).unwrap_or(usize::MAX);
            Ok(rows.into_iter().skip(offset).take(limit).collect())
        })
    }

    fn page_total<'a>(&'a self, table: &'a str, args: &'a ParsedArgs) -> DriverFuture<'a, u64> {
        Box::pin(async move {
            self.record(DriverOp::PageTotal, table, Some(args));
            Ok(self.select(table, args)?.len() as u64)
        })
    }

    fn first_of<'a>(
        &'a self,
        table: &'a str,
        args: &'a ParsedArgs,
    ) -> DriverFuture<'a, Option<Value>> {
        Box::pin(async move {
            self.record(DriverOp::FirstOf, table, Some(args));
            Ok(self.select(table, args)?.into_iter().next())
        })
    }

    fn put_item<'a>(
        &'a self,
        table: &'a str,
        input: &'a Map<String, Value>,
    ) -> DriverFuture<'a, Vec<Value>> {
        Box::pin(async move {
            self.record(DriverOp::PutItem, table, None);
            let meta = self.meta(table)?;
            let pk = self.primary_key(table)?;

            for key in input.keys() {
                if meta.get_column(key).is_none() {
                    return Err(DriverError::UnknownColumn {
                        table: table.to_string(),
                        column: key.clone(),
                    });
                }
            }

            let mut data = self
                .data
                .write()
                .map_err(|_| DriverError::Internal("Lock poisoned".to_string()))?;
            let rows = data.entry(table.to_string()).or_default();

            let supplied = input.get(&pk).filter(|v| !v.is_null()).cloned();
            if let Some(id) = supplied {
                match rows.iter().position(|r| r.get(&pk) == Some(&id)) {
                    Some(idx) => {
                        if let Value::Object(existing) = &mut rows[idx] {
                            for (key, value) in input {
                                existing.insert(key.clone(), value.clone());
                            }
                        }
                    }
                    None => rows.push(new_row(meta, input)),
                }
                return Ok(Vec::new());
            }

            let next_id = rows
                .iter()
                .filter_map(|r| r.get(&pk).and_then(Value::as_i64))
                .max()
                .unwrap_or(0)
                + 1;
            let mut row = new_row(meta, input);
            if let Value::Object(obj) = &mut row {
                obj.insert(pk, Value::from(next_id));
            }
            rows.push(row);

            Ok(vec![Value::from(next_id)])
        })
    }
}

/// Row with every column present, unset columns null
fn new_row(meta: &TableMetadata, input: &Map<String, Value>) -> Value {
    let mut row = Map::new();
    for column in &meta.columns {
        let value = input.get(&column.name).cloned().unwrap_or(Value::Null);
        row.insert(column.name.clone(), value);
    }
    Value::Object(row)
}

/// Compare JSON values for sorting
fn compare_json_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .unwrap_or(0.0)
            .partial_cmp(&b.as_f64().unwrap_or(0.0))
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(Value::Null) | None, Some(Value::Null) | None) => Ordering::Equal,
        (Some(_), Some(Value::Null) | None) => Ordering::Less,
        (Some(Value::Null) | None, Some(_)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}
