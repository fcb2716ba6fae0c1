//! Schema compiler
//!
//! Builds a [`SchemaModel`] from driver metadata and renders it to SDL.
//!
//! Per table the compiler runs five passes: object type, page type, root
//! query fields, input type, root mutation field. Passes are idempotent for
//! an unchanged driver response but never remove fields: shrinking driver
//! output leaves previously generated fields in place.

use std::sync::Arc;

use tracing::{debug, warn};

use super::render::render_schema;
use super::types::{FieldDef, SchemaModel, SkippedColumn, TypeRef, BOOLEAN, INT, STRING};
use crate::driver::{ColumnMeta, Driver, DriverResult, TableMetadata};
use crate::naming;

/// Incremental schema compiler
pub struct SchemaCompiler {
    /// Metadata source
    driver: Arc<dyn Driver>,

    /// Model under construction
    model: SchemaModel,

    /// Columns whose type could not be mapped
    skipped: Vec<SkippedColumn>,

    /// Cached SDL, cleared only by `refresh`
    rendered: Option<String>,
}

impl SchemaCompiler {
    /// Create a compiler with the `Condition` input pre-registered
    pub fn new(driver: Arc<dyn Driver>) -> Self {
        let mut model = SchemaModel::new();
        model.set_input_field(
            naming::CONDITION,
            "sql",
            TypeRef::named(STRING).non_null(),
        );
        model.set_input_field(
            naming::CONDITION,
            "val",
            TypeRef::list(TypeRef::named(STRING).non_null()).non_null(),
        );

        Self {
            driver,
            model,
            skipped: Vec::new(),
            rendered: None,
        }
    }

    /// Run every pass over every table the driver reports
    pub fn build(&mut self) -> DriverResult<()> {
        let metas = self
            .driver
            .tables()
            .iter()
            .map(|t| self.driver.table_metadata(t))
            .collect::<DriverResult<Vec<_>>>()?;

        // Page types follow all table types
        for meta in &metas {
            self.map_type(meta);
        }
        for meta in &metas {
            self.map_page(&meta.name);
        }
        for meta in &metas {
            self.map_query(&meta.name);
        }
        for meta in &metas {
            self.map_input(meta);
        }
        for meta in &metas {
            self.map_mutation(&meta.name);
        }

        debug!(
            tables = metas.len(),
            skipped = self.skipped.len(),
            "schema build complete"
        );
        Ok(())
    }

    /// Run every pass for a single table
    pub fn build_table(&mut self, table: &str) -> DriverResult<()> {
        let meta = self.driver.table_metadata(table)?;
        self.map_type(&meta);
        self.map_page(table);
        self.map_query(table);
        self.map_input(&meta);
        self.map_mutation(table);
        debug!(table, "table build complete");
        Ok(())
    }

    /// Object type with scalar, foreign and reverse relation fields
    pub fn map_type(&mut self, meta: &TableMetadata) {
        let type_name = naming::type_name(&meta.name);
        self.model.types.entry(type_name.clone()).or_default();

        for column in &meta.columns {
            if let Some(ty) = self.map_column(&meta.name, &type_name, column) {
                self.model
                    .set_field(&type_name, FieldDef::new(&column.name, ty));
            }
        }

        for (column, foreign) in meta.foreign_keys() {
            let field = FieldDef::new(
                naming::foreign_field_name(&column.name, &foreign.tablename),
                TypeRef::named(naming::type_name(&foreign.tablename)),
            )
            .with_query_params();
            self.model.set_field(&type_name, field);
        }

        for relation in &meta.reverse {
            let field = FieldDef::new(
                naming::reverse_field_name(&relation.ftablename),
                TypeRef::named(naming::page_type_name(&relation.ftablename)),
            )
            .with_query_params();
            self.model.set_field(&type_name, field);
        }
    }

    /// `<Type>Page { total: Int, items: [<Type>] }`
    pub fn map_page(&mut self, table: &str) {
        let page = naming::page_type_name(table);
        self.model
            .set_field(&page, FieldDef::new("total", TypeRef::named(INT)));
        self.model.set_field(
            &page,
            FieldDef::new("items", TypeRef::list(TypeRef::named(naming::type_name(table)))),
        );
    }

    /// `Query.<type>GetPage` and `Query.<type>GetFirst`
    pub fn map_query(&mut self, table: &str) {
        self.model.set_field(
            naming::QUERY,
            FieldDef::new(
                naming::get_page_field(table),
                TypeRef::named(naming::page_type_name(table)),
            )
            .with_query_params(),
        );
        self.model.set_field(
            naming::QUERY,
            FieldDef::new(
                naming::get_first_field(table),
                TypeRef::named(naming::type_name(table)),
            )
            .with_query_params(),
        );
    }

    /// `<Type>Input` with one scalar field per mappable column
    pub fn map_input(&mut self, meta: &TableMetadata) {
        let input = naming::input_type_name(&meta.name);
        self.model.inputs.entry(input.clone()).or_default();

        for column in &meta.columns {
            if let Some(ty) = self.map_column(&meta.name, &input, column) {
                self.model.set_input_field(&input, &column.name, ty);
            }
        }
    }

    /// `Mutation.<type>PutItem(input: <Type>Input!, _debug: Boolean): <Type>`
    pub fn map_mutation(&mut self, table: &str) {
        self.model.set_field(
            naming::MUTATION,
            FieldDef::new(
                naming::put_item_field(table),
                TypeRef::named(naming::type_name(table)),
            )
            .param(
                "input",
                TypeRef::named(naming::input_type_name(table)).non_null(),
            )
            .param("_debug", TypeRef::named(BOOLEAN)),
        );
    }

    /// Inject a field; replaces any same-named field
    pub fn add_field(&mut self, type_name: &str, field: FieldDef) {
        self.model.set_field(type_name, field);
    }

    /// Inject an input field; replaces any same-named field
    pub fn add_input_field(&mut self, input: &str, name: &str, ty: TypeRef) {
        self.model.set_input_field(input, name, ty);
    }

    pub fn model(&self) -> &SchemaModel {
        &self.model
    }

    pub fn into_model(self) -> SchemaModel {
        self.model
    }

    /// Columns omitted because the driver could not map their type
    pub fn skipped_columns(&self) -> &[SkippedColumn] {
        &self.skipped
    }

    /// Rendered SDL, computed on first use and cached
    pub fn render(&mut self) -> &str {
        let model = &self.model;
        self.rendered
            .get_or_insert_with(|| render_schema(model))
            .as_str()
    }

    /// Discard the cached SDL and render again
    pub fn refresh(&mut self) -> &str {
        self.rendered = None;
        self.render()
    }

    /// Render the current model without touching the cache
    pub fn render_fresh(&self) -> String {
        render_schema(&self.model)
    }

    fn map_column(&mut self, table: &str, target: &str, column: &ColumnMeta) -> Option<TypeRef> {
        match self.driver.map_column_type(column) {
            Ok(scalar) => {
                self.skipped
                    .retain(|s| !(s.target == target && s.column == column.name));
                Some(TypeRef::named(scalar))
            }
            Err(reason) => {
                warn!(
                    table,
                    column = %column.name,
                    target,
                    error = %reason,
                    "column type not mappable, skipping"
                );
                self.skipped
                    .retain(|s| !(s.target == target && s.column == column.name));
                self.skipped.push(SkippedColumn {
                    table: table.to_string(),
                    column: column.name.clone(),
                    target: target.to_string(),
                    reason,
                });
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{InMemoryDriver, ReverseRelation};

    fn create_driver() -> Arc<InMemoryDriver> {
        Arc::new(
            InMemoryDriver::new()
                .with_table(
                    TableMetadata::new("foo")
                        .column(ColumnMeta::new("id", "serial"))
                        .column(ColumnMeta::new("name", "boolean")),
                    "id",
                )
                .with_table(
                    TableMetadata::new("bar")
                        .column(ColumnMeta::new("id", "serial"))
                        .column(ColumnMeta::new("foo_id", "integer").references("foo", "id")),
                    "id",
                ),
        )
    }

    fn field_names(model: &SchemaModel, type_name: &str) -> Vec<String> {
        model
            .type_fields(type_name)
            .map(|f| f.keys().cloned().collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_build_types_and_pages() {
        let mut compiler = SchemaCompiler::new(create_driver());
        compiler.build().unwrap();
        let model = compiler.model();

        let types: Vec<_> = model.types.keys().cloned().collect();
        assert_eq!(types, vec!["Foo", "Bar", "FooPage", "BarPage", "Query", "Mutation"]);
        assert_eq!(field_names(model, "Foo"), vec!["id", "name"]);
        assert_eq!(field_names(model, "Bar"), vec!["id", "foo_id", "foo_id_foo"]);
        assert_eq!(
            model.field("Bar", "foo_id_foo").unwrap().ty,
            TypeRef::named("Foo")
        );
    }

    #[test]
    fn test_reverse_relation_field() {
        let driver = Arc::new(InMemoryDriver::new().with_table(
            TableMetadata::new("foo")
                .column(ColumnMeta::new("id", "serial"))
                .reverse(ReverseRelation::new("bar", "foo_id", "id")),
            "id",
        ));
        let mut compiler = SchemaCompiler::new(driver);
        compiler.build().unwrap();

        let field = compiler.model().field("Foo", "bar").unwrap();
        assert_eq!(field.ty, TypeRef::named("BarPage"));
        assert_eq!(field.params.len(), 5);
    }

    #[test]
    fn test_no_reverse_relations_no_page_field() {
        let mut compiler = SchemaCompiler::new(create_driver());
        compiler.build().unwrap();
        let fields = compiler.model().type_fields("Foo").unwrap();
        assert!(fields.values().all(|f| !f.ty.base_name().ends_with("Page")));
    }

    #[test]
    fn test_unmappable_column_skipped() {
        let driver = Arc::new(InMemoryDriver::new().with_table(
            TableMetadata::new("doc")
                .column(ColumnMeta::new("id", "serial"))
                .column(ColumnMeta::new("body", "jsonb")),
            "id",
        ));
        let mut compiler = SchemaCompiler::new(driver);
        compiler.build().unwrap();

        assert_eq!(field_names(compiler.model(), "Doc"), vec!["id"]);
        let input: Vec<_> = compiler
            .model()
            .input_fields("DocInput")
            .unwrap()
            .keys()
            .cloned()
            .collect();
        assert_eq!(input, vec!["id"]);

        let skipped = compiler.skipped_columns();
        assert_eq!(skipped.len(), 2);
        assert_eq!(skipped[0].column, "body");
        assert_eq!(skipped[0].target, "Doc");
        assert_eq!(skipped[1].target, "DocInput");

        // Rebuilding does not duplicate the record
        compiler.build().unwrap();
        assert_eq!(compiler.skipped_columns().len(), 2);
    }

    #[test]
    fn test_build_table_idempotent() {
        let mut compiler = SchemaCompiler::new(create_driver());
        compiler.build_table("bar").unwrap();
        let first = compiler.render_fresh();
        compiler.build_table("bar").unwrap();
        assert_eq!(compiler.render_fresh(), first);
    }

    #[test]
    fn test_render_is_cached_until_refresh() {
        let mut compiler = SchemaCompiler::new(create_driver());
        compiler.build().unwrap();
        let before = compiler.render().to_string();

        compiler.add_field("Foo", FieldDef::new("extra", TypeRef::named(STRING)));
        assert_eq!(compiler.render(), before);
        assert!(compiler.refresh().contains("extra: String"));
    }

    #[test]
    fn test_mutation_params() {
        let mut compiler = SchemaCompiler::new(create_driver());
        compiler.build().unwrap();
        let field = compiler.model().field("Mutation", "fooPutItem").unwrap();
        assert_eq!(field.params["input"].to_string(), "FooInput!");
        assert_eq!(field.params["_debug"].to_string(), "Boolean");
        assert_eq!(field.ty, TypeRef::named("Foo"));
    }
}
