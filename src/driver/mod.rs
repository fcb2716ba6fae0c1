//! # Database Driver Contract
//!
//! The database collaborator consumed by the schema compiler and the
//! generated resolvers: introspection, native-type mapping, and record access.

pub mod errors;
pub mod memory;
pub mod metadata;

use std::future::Future;
use std::pin::Pin;

use serde_json::{Map, Value};

use crate::expr::ParsedArgs;

pub use errors::{DriverError, DriverResult};
pub use memory::{DriverCall, DriverOp, InMemoryDriver};
pub use metadata::{ColumnMeta, ForeignRef, ReverseRelation, TableMetadata};

/// Future returned by driver data operations
pub type DriverFuture<'a, T> = Pin<Box<dyn Future<Output = DriverResult<T>> + Send + 'a>>;

/// Database collaborator
pub trait Driver: Send + Sync {
    /// Table names in the driver's own order
    fn tables(&self) -> Vec<String>;

    /// Structural metadata for a table
    fn table_metadata(&self, table: &str) -> DriverResult<TableMetadata>;

    /// Column names for a table, in enumeration order
    fn table_columns(&self, table: &str) -> DriverResult<Vec<String>> {
        Ok(self
            .table_metadata(table)?
            .columns
            .into_iter()
            .map(|c| c.name)
            .collect())
    }

    /// Scalar type name for a column (e.g. `Int`); may fail per column
    fn map_column_type(&self, column: &ColumnMeta) -> DriverResult<String>;

    /// Primary-key column of a table
    fn primary_key(&self, table: &str) -> DriverResult<String>;

    /// Records matching `args`
    fn page<'a>(&'a self, table: &'a str, args: &'a ParsedArgs) -> DriverFuture<'a, Vec<Value>>;

    /// Count of records matching `args`, ignoring pagination
    fn page_total<'a>(&'a self, table: &'a str, args: &'a ParsedArgs) -> DriverFuture<'a, u64>;

    /// First record matching `args`
    fn first_of<'a>(
        &'a self,
        table: &'a str,
        args: &'a ParsedArgs,
    ) -> DriverFuture<'a, Option<Value>>;

    /// Insert or update a record, returning newly assigned ids
    fn put_item<'a>(
        &'a self,
        table: &'a str,
        input: &'a Map<String, Value>,
    ) -> DriverFuture<'a, Vec<Value>>;
}
