//! # Generated CRUD Resolvers
//!
//! Default table operations backing `Query.<type>GetPage`,
//! `Query.<type>GetFirst` and `Mutation.<type>PutItem`.

use futures_util::future::try_join;
use serde_json::{json, Value};

use super::context::ResolverContext;
use super::errors::{ResolverError, ResolverResult};
use crate::driver::DriverError;
use crate::expr::{
    parse_args_common, value_literal, Args, FilterClause, FilterCondition, PaginationSpec,
    ParsedArgs,
};
use crate::naming::put_item_field;

/// One page of records plus the unpaginated total.
///
/// Both driver calls receive identical parsed arguments and run
/// concurrently; they are not transactionally linked.
pub async fn get_page(ctx: &ResolverContext, table: &str, args: &Args) -> ResolverResult<Value> {
    let parsed = parse_args_common(table, args)?;
    fetch_page(ctx, table, parsed).await
}

/// [`get_page`] for arguments that are already parsed
pub async fn fetch_page(ctx: &ResolverContext, table: &str, mut parsed: ParsedArgs) -> ResolverResult<Value> {
    apply_default_limit(&mut parsed, ctx.default_page_limit());

    let db = ctx.db.as_ref();
    let (total, items) = try_join(db.page_total(table, &parsed), db.page(table, &parsed)).await?;

    Ok(page_value(table, total, items))
}

/// First matching record, or null
pub async fn get_first_of(ctx: &ResolverContext, table: &str, args: &Args) -> ResolverResult<Value> {
    let parsed = parse_args_common(table, args)?;
    fetch_first_of(ctx, table, &parsed).await
}

/// [`get_first_of`] for arguments that are already parsed
pub async fn fetch_first_of(ctx: &ResolverContext, table: &str, parsed: &ParsedArgs) -> ResolverResult<Value> {
    let record = ctx.db.first_of(table, parsed).await?;
    Ok(record.unwrap_or(Value::Null))
}

/// Upsert `args.input` and return the stored record.
///
/// When the input carries no primary-key value, the first id reported by
/// the driver is used to re-fetch.
pub async fn put_item(ctx: &ResolverContext, table: &str, args: &Args) -> ResolverResult<Value> {
    let input = args
        .get("input")
        .and_then(Value::as_object)
        .ok_or_else(|| {
            ResolverError::InvalidArgument(format!(
                "{} requires an input object",
                put_item_field(table)
            ))
        })?;

    let db = ctx.db.as_ref();
    let pk = db.primary_key(table)?;
    let supplied = input.get(&pk).and_then(value_literal);
    let assigned = db.put_item(table, input).await?;

    let id = match supplied {
        Some(id) => id,
        None => assigned.first().and_then(value_literal).ok_or_else(|| {
            DriverError::Internal(format!("no id reported for new record in '{}'", table))
        })?,
    };

    let lookup = ParsedArgs::with_filter(table, FilterCondition::new(table).and(FilterClause::eq(pk, id)));
    let record = db.first_of(table, &lookup).await?;
    Ok(record.unwrap_or(Value::Null))
}

/// Page value with no items
pub fn empty_page(table: &str) -> Value {
    page_value(table, 0, Vec::new())
}

fn page_value(table: &str, total: u64, items: Vec<Value>) -> Value {
    json!({
        "total": total,
        "tablename": table,
        "items": items,
    })
}

fn apply_default_limit(parsed: &mut ParsedArgs, limit: Option<u64>) {
    let Some(limit) = limit else {
        return;
    };
    let table = parsed.table.clone();
    let pagination = parsed
        .pagination
        .get_or_insert_with(|| PaginationSpec::new(table));
    if !pagination.contains("limit") {
        pagination.set("limit", limit.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{ColumnMeta, DriverOp, InMemoryDriver, TableMetadata};
    use crate::resolver::{RequestContext, ResolverRegistry};
    use std::sync::Arc;

    fn create_driver() -> Arc<InMemoryDriver> {
        let meta = TableMetadata::new("foo")
            .column(ColumnMeta::new("id", "serial"))
            .column(ColumnMeta::new("name", "text"));
        Arc::new(
            InMemoryDriver::new().with_table(meta, "id").with_rows(
                "foo",
                vec![
                    json!({"id": 1, "name": "a"}),
                    json!({"id": 2, "name": "b"}),
                    json!({"id": 3, "name": "c"}),
                ],
            ),
        )
    }

    fn create_context(driver: Arc<InMemoryDriver>, limit: Option<u64>) -> ResolverContext {
        let registry = ResolverRegistry::new(driver.clone()).with_default_page_limit(limit);
        ResolverContext::new(RequestContext::new(), registry.get_resolvers(), driver)
    }

    fn args(value: Value) -> Args {
        value.as_object().cloned().unwrap_or_default()
    }

    #[tokio::test]
    async fn test_get_page_shape() {
        let ctx = create_context(create_driver(), None);
        let page = get_page(&ctx, "foo", &args(json!({"filter": "id>1"}))).await.unwrap();

        assert_eq!(page["total"], json!(2));
        assert_eq!(page["tablename"], json!("foo"));
        assert_eq!(page["items"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_get_page_issues_both_fetches() {
        let driver = create_driver();
        let ctx = create_context(driver.clone(), None);
        get_page(&ctx, "foo", &Args::new()).await.unwrap();

        let ops: Vec<DriverOp> = driver.calls().into_iter().map(|c| c.op).collect();
        assert_eq!(ops.len(), 2);
        assert!(ops.contains(&DriverOp::Page));
        assert!(ops.contains(&DriverOp::PageTotal));
    }

    #[tokio::test]
    async fn test_default_page_limit() {
        let ctx = create_context(create_driver(), Some(2));
        let page = get_page(&ctx, "foo", &Args::new()).await.unwrap();
        assert_eq!(page["total"], json!(3));
        assert_eq!(page["items"].as_array().unwrap().len(), 2);

        let page = get_page(&ctx, "foo", &args(json!({"pagination": "limit=1"})))
            .await
            .unwrap();
        assert_eq!(page["items"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_first_of_missing_is_null() {
        let ctx = create_context(create_driver(), None);
        let record = get_first_of(&ctx, "foo", &args(json!({"filter": "id=9"}))).await.unwrap();
        assert_eq!(record, Value::Null);
    }

    #[tokio::test]
    async fn test_parse_error_surfaces() {
        let ctx = create_context(create_driver(), None);
        let err = get_first_of(&ctx, "foo", &args(json!({"filter": "id"}))).await.unwrap_err();
        assert!(matches!(err, ResolverError::Parse(_)));
    }

    #[tokio::test]
    async fn test_put_item_requires_input() {
        let ctx = create_context(create_driver(), None);
        let err = put_item(&ctx, "foo", &Args::new()).await.unwrap_err();
        assert_eq!(err.code(), "RELGRAPH_INVALID_ARGUMENT");
    }

    #[tokio::test]
    async fn test_put_item_updates_existing() {
        let driver = create_driver();
        let ctx = create_context(driver.clone(), None);
        let record = put_item(&ctx, "foo", &args(json!({"input": {"id": 2, "name": "z"}})))
            .await
            .unwrap();

        assert_eq!(record, json!({"id": 2, "name": "z"}));
        assert_eq!(driver.rows("foo").len(), 3);
    }

    #[tokio::test]
    async fn test_put_item_uses_assigned_id() {
        let driver = create_driver();
        let ctx = create_context(driver.clone(), None);
        let record = put_item(&ctx, "foo", &args(json!({"input": {"name": "d"}})))
            .await
            .unwrap();

        assert_eq!(record, json!({"id": 4, "name": "d"}));
        let last = driver.calls().pop().unwrap();
        assert_eq!(last.op, DriverOp::FirstOf);
        assert_eq!(last.filter.as_deref(), Some("id=4"));
    }
}
