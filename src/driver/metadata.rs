//! # Table Metadata
//!
//! Structural metadata the driver reports for each table. Foreign and
//! reverse relations default to empty; a driver that cannot describe them
//! must still produce the empty collections.

use serde::{Deserialize, Serialize};

/// Target of a foreign-key column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignRef {
    /// Referenced table
    pub tablename: String,

    /// Referenced column
    pub columnname: String,
}

/// A column as reported by the driver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMeta {
    /// Column name
    pub name: String,

    /// Native database type (e.g. `serial`, `boolean`)
    #[serde(rename = "type")]
    pub native_type: String,

    /// Foreign-key target, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign: Option<ForeignRef>,
}

impl ColumnMeta {
    pub fn new(name: impl Into<String>, native_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            native_type: native_type.into(),
            foreign: None,
        }
    }

    /// Mark this column as referencing `table.column`
    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.foreign = Some(ForeignRef {
            tablename: table.into(),
            columnname: column.into(),
        });
        self
    }
}

/// A child table referencing this one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReverseRelation {
    /// Child table
    pub ftablename: String,

    /// Column on the child table holding the reference
    pub fcolumnname: String,

    /// Column on this table being referenced
    pub columnname: String,
}

impl ReverseRelation {
    pub fn new(
        ftablename: impl Into<String>,
        fcolumnname: impl Into<String>,
        columnname: impl Into<String>,
    ) -> Self {
        Self {
            ftablename: ftablename.into(),
            fcolumnname: fcolumnname.into(),
            columnname: columnname.into(),
        }
    }
}

/// Structural metadata for one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMetadata {
    /// Table name
    pub name: String,

    /// Columns in driver enumeration order
    pub columns: Vec<ColumnMeta>,

    /// Child tables referencing this one
    #[serde(default)]
    pub reverse: Vec<ReverseRelation>,
}

impl TableMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            reverse: Vec::new(),
        }
    }

    /// Append a column
    pub fn column(mut self, column: ColumnMeta) -> Self {
        self.columns.push(column);
        self
    }

    /// Append a reverse relation
    pub fn reverse(mut self, relation: ReverseRelation) -> Self {
        self.reverse.push(relation);
        self
    }

    /// Find a column by name
    pub fn get_column(&self, name: &str) -> Option<&ColumnMeta> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Columns carrying a foreign key, paired with their target
    pub fn foreign_keys(&self) -> impl Iterator<Item = (&ColumnMeta, &ForeignRef)> {
        self.columns
            .iter()
            .filter_map(|c| c.foreign.as_ref().map(|f| (c, f)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_relations_default_to_empty() {
        let meta: TableMetadata = serde_json::from_value(serde_json::json!({
            "name": "foo",
            "columns": [{"name": "id", "type": "serial"}]
        }))
        .unwrap();

        assert!(meta.reverse.is_empty());
        assert!(meta.columns[0].foreign.is_none());
    }

    #[test]
    fn test_foreign_keys() {
        let meta = TableMetadata::new("bar")
            .column(ColumnMeta::new("id", "serial"))
            .column(ColumnMeta::new("foo_id", "integer").references("foo", "id"));

        let fks: Vec<_> = meta.foreign_keys().map(|(c, f)| (&c.name, &f.tablename)).collect();
        assert_eq!(fks.len(), 1);
        assert_eq!(fks[0].0, "foo_id");
        assert_eq!(fks[0].1, "foo");
    }
}
