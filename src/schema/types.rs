//! Schema model types
//!
//! The in-memory graph schema: object types with parameterised fields and
//! input types with plain fields. Maps preserve first-insertion order and
//! re-inserting a name replaces the definition in place.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::driver::DriverError;
use crate::naming;

/// Built-in scalar names
pub const INT: &str = "Int";
pub const STRING: &str = "String";
pub const BOOLEAN: &str = "Boolean";

/// Reference to a scalar or named type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum TypeRef {
    /// Scalar or object/input type by name
    Named(String),
    /// `[T]`
    List(Box<TypeRef>),
    /// `T!`
    NonNull(Box<TypeRef>),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    pub fn list(inner: TypeRef) -> Self {
        TypeRef::List(Box::new(inner))
    }

    /// Wrap as non-null
    pub fn non_null(self) -> Self {
        TypeRef::NonNull(Box::new(self))
    }

    /// Innermost type name
    pub fn base_name(&self) -> &str {
        match self {
            TypeRef::Named(name) => name,
            TypeRef::List(inner) | TypeRef::NonNull(inner) => inner.base_name(),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(name) => f.write_str(name),
            TypeRef::List(inner) => write!(f, "[{inner}]"),
            TypeRef::NonNull(inner) => write!(f, "{inner}!"),
        }
    }
}

/// Field of an object type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDef {
    /// Field name
    pub name: String,

    /// Result type
    #[serde(rename = "type")]
    pub ty: TypeRef,

    /// Parameters in declaration order
    pub params: IndexMap<String, TypeRef>,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            params: IndexMap::new(),
        }
    }

    /// Add a parameter
    pub fn param(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.params.insert(name.into(), ty);
        self
    }

    /// Attach the standard query parameter set
    pub fn with_query_params(mut self) -> Self {
        self.params.extend(standard_query_params());
        self
    }
}

/// Fields of an object type
pub type TypeFields = IndexMap<String, FieldDef>;

/// Fields of an input type
pub type InputFields = IndexMap<String, TypeRef>;

/// Complete schema model
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaModel {
    /// Object types
    pub types: IndexMap<String, TypeFields>,

    /// Input types
    pub inputs: IndexMap<String, InputFields>,
}

impl SchemaModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fields of an object type
    pub fn type_fields(&self, type_name: &str) -> Option<&TypeFields> {
        self.types.get(type_name)
    }

    /// A single object field
    pub fn field(&self, type_name: &str, field: &str) -> Option<&FieldDef> {
        self.types.get(type_name)?.get(field)
    }

    pub fn has_field(&self, type_name: &str, field: &str) -> bool {
        self.field(type_name, field).is_some()
    }

    /// Fields of an input type
    pub fn input_fields(&self, input: &str) -> Option<&InputFields> {
        self.inputs.get(input)
    }

    /// Insert or replace an object field
    pub fn set_field(&mut self, type_name: &str, field: FieldDef) {
        self.types
            .entry(type_name.to_string())
            .or_default()
            .insert(field.name.clone(), field);
    }

    /// Insert or replace an input field
    pub fn set_input_field(&mut self, input: &str, name: &str, ty: TypeRef) {
        self.inputs
            .entry(input.to_string())
            .or_default()
            .insert(name.to_string(), ty);
    }
}

/// `filter`, `pagination`, `where`, `_debug`, `_cache`
pub fn standard_query_params() -> IndexMap<String, TypeRef> {
    let mut params = IndexMap::new();
    params.insert("filter".to_string(), TypeRef::named(STRING));
    params.insert("pagination".to_string(), TypeRef::named(STRING));
    params.insert("where".to_string(), TypeRef::named(naming::CONDITION));
    params.insert("_debug".to_string(), TypeRef::named(BOOLEAN));
    params.insert("_cache".to_string(), TypeRef::named(BOOLEAN));
    params
}

/// A column left out of a type or input because its type could not be mapped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedColumn {
    /// Source table
    pub table: String,

    /// Column name
    pub column: String,

    /// Type or input the column was omitted from
    pub target: String,

    /// Mapping failure reported by the driver
    pub reason: DriverError,
}
