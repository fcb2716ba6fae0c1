//! Schema compiler subsystem
//!
//! Turns driver table metadata into a typed schema model and renders it
//! to SDL text for the execution engine.
//!
//! # Generated shape
//!
//! - One object type, one `<Type>Page` and one `<Type>Input` per table
//! - One singular relation field per foreign-key column
//! - One paginated relation field per reverse relation
//! - `Query.<type>GetPage`, `Query.<type>GetFirst`, `Mutation.<type>PutItem`
//! - Manually injected fields replace generated ones of the same name

mod compiler;
mod render;
mod types;

pub use compiler::SchemaCompiler;
pub use render::{render_field, render_schema};
pub use types::{
    standard_query_params, FieldDef, InputFields, SchemaModel, SkippedColumn, TypeFields, TypeRef,
    BOOLEAN, INT, STRING,
};
