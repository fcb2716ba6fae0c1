//! # Relation Resolver Synthesis
//!
//! Registers the default resolvers for every table the driver reports:
//! CRUD on the root types, a singular resolver per foreign-key column and a
//! paginated resolver per reverse relation. Field names come from
//! [`crate::naming`], the same source the schema compiler uses.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::context::ResolverContext;
use super::crud;
use super::errors::ResolverResult;
use super::registry::ResolverRegistry;
use crate::driver::{DriverResult, TableMetadata};
use crate::expr::{
    parse_args_common, value_literal, Args, FilterClause, FilterCondition, ParsedArgs,
};
use crate::naming::{
    foreign_field_name, get_first_field, get_page_field, put_item_field, reverse_field_name,
    type_name, MUTATION, QUERY,
};

/// Register resolvers for every table of the registry's driver
pub fn synthesize(registry: &mut ResolverRegistry) -> DriverResult<()> {
    let driver = Arc::clone(registry.driver());
    for table in driver.tables() {
        let meta = driver.table_metadata(&table)?;
        register_table(registry, &meta);
    }
    Ok(())
}

/// Register the CRUD and relation resolvers of one table
pub fn register_table(registry: &mut ResolverRegistry, meta: &TableMetadata) {
    register_crud(registry, &meta.name);

    let owner = type_name(&meta.name);
    for (column, foreign) in meta.foreign_keys() {
        let link = Arc::new(Relation {
            parent_column: column.name.clone(),
            table: foreign.tablename.clone(),
            column: foreign.columnname.clone(),
        });
        let field = foreign_field_name(&column.name, &foreign.tablename);
        registry.add(&owner, &field, move |parent, args, ctx| {
            let link = Arc::clone(&link);
            async move { link.resolve_single(parent, args, ctx).await }
        });
    }

    for reverse in &meta.reverse {
        let link = Arc::new(Relation {
            parent_column: reverse.columnname.clone(),
            table: reverse.ftablename.clone(),
            column: reverse.fcolumnname.clone(),
        });
        let field = reverse_field_name(&reverse.ftablename);
        registry.add(&owner, &field, move |parent, args, ctx| {
            let link = Arc::clone(&link);
            async move { link.resolve_page(parent, args, ctx).await }
        });
    }

    debug!(
        table = %meta.name,
        foreign = meta.foreign_keys().count(),
        reverse = meta.reverse.len(),
        "resolvers synthesized"
    );
}

fn register_crud(registry: &mut ResolverRegistry, table: &str) {
    let name = table.to_string();
    registry.add(QUERY, &get_page_field(table), move |_parent, args, ctx| {
        let table = name.clone();
        async move { crud::get_page(&ctx, &table, &args).await }
    });

    let name = table.to_string();
    registry.add(QUERY, &get_first_field(table), move |_parent, args, ctx| {
        let table = name.clone();
        async move { crud::get_first_of(&ctx, &table, &args).await }
    });

    let name = table.to_string();
    registry.add(MUTATION, &put_item_field(table), move |_parent, args, ctx| {
        let table = name.clone();
        async move { crud::put_item(&ctx, &table, &args).await }
    });
}

/// Join between a parent record and a related table
#[derive(Debug)]
struct Relation {
    /// Column of the parent record holding the join value
    parent_column: String,

    /// Related table
    table: String,

    /// Column of the related table matched against the join value
    column: String,
}

impl Relation {
    /// Single related record, or null when the parent value is absent
    async fn resolve_single(&self, parent: Value, args: Args, ctx: ResolverContext) -> ResolverResult<Value> {
        let value = match parent.get(&self.parent_column).and_then(value_literal) {
            Some(value) => value,
            None => return Ok(Value::Null),
        };
        let parsed = self.scoped_args(&args, value)?;
        crud::fetch_first_of(&ctx, &self.table, &parsed).await
    }

    /// Page of related records, or an empty page when the parent value is absent
    async fn resolve_page(&self, parent: Value, args: Args, ctx: ResolverContext) -> ResolverResult<Value> {
        let value = match parent.get(&self.parent_column).and_then(value_literal) {
            Some(value) => value,
            None => return Ok(crud::empty_page(&self.table)),
        };
        let parsed = self.scoped_args(&args, value)?;
        crud::fetch_page(&ctx, &self.table, parsed).await
    }

    /// Caller filter clauses first, then an equality clause on the join value.
    ///
    /// The join value is added as a typed clause and never goes through the
    /// filter text syntax, so `,` and `;` in key values stay literal.
    fn scoped_args(&self, args: &Args, value: String) -> ResolverResult<ParsedArgs> {
        let mut parsed = parse_args_common(&self.table, args)?;
        let condition = parsed
            .filter
            .take()
            .unwrap_or_else(|| FilterCondition::new(self.table.as_str()));
        parsed.filter = Some(condition.and(FilterClause::eq(self.column.as_str(), value)));
        Ok(parsed)
    }
}
