//! # Gateway Assembly
//!
//! Wires the schema compiler and the resolver registry to one driver:
//! compile the schema, synthesize the default resolvers, apply manual
//! overrides, then freeze both halves into a read-only [`Gateway`].

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::config::{ConfigError, GatewayConfig};
use crate::driver::{Driver, DriverError};
use crate::expr::Args;
use crate::resolver::{
    synthesize, Authorizer, RequestContext, ResolverContext, ResolverError, ResolverMap,
    ResolverRegistry, ResolverResult,
};
use crate::schema::{FieldDef, SchemaCompiler, SchemaModel, SkippedColumn, TypeRef};

/// Result type for gateway assembly
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Gateway assembly errors
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error(transparent)]
    Resolver(#[from] ResolverError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl GatewayError {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::Driver(e) => e.code(),
            GatewayError::Resolver(e) => e.code(),
            GatewayError::Config(e) => e.code(),
        }
    }
}

/// Build phase: schema and resolvers are still mutable
pub struct GatewayBuilder {
    config: GatewayConfig,
    compiler: SchemaCompiler,
    registry: ResolverRegistry,
}

impl GatewayBuilder {
    /// Compile the schema and synthesize default resolvers for `driver`
    pub fn new(driver: Arc<dyn Driver>, config: GatewayConfig) -> GatewayResult<Self> {
        let mut compiler = SchemaCompiler::new(Arc::clone(&driver));
        compiler.build()?;

        let mut registry =
            ResolverRegistry::new(driver).with_default_page_limit(config.default_page_limit);
        synthesize(&mut registry)?;

        Ok(Self {
            config,
            compiler,
            registry,
        })
    }

    /// Like [`GatewayBuilder::new`], with configuration read from a JSON file
    pub fn from_config_file(driver: Arc<dyn Driver>, path: &Path) -> GatewayResult<Self> {
        let config = GatewayConfig::load(path)?;
        Self::new(driver, config)
    }

    /// Inject or replace an object field
    pub fn field(mut self, type_name: &str, field: FieldDef) -> Self {
        self.compiler.add_field(type_name, field);
        self
    }

    /// Inject or replace an input field
    pub fn input_field(mut self, input: &str, name: &str, ty: TypeRef) -> Self {
        self.compiler.add_input_field(input, name, ty);
        self
    }

    /// Register a manual resolver.
    ///
    /// Replaces any existing resolver for the key unless
    /// `strict_registration` is set, in which case the key must be free.
    pub fn resolver<F, Fut>(mut self, namespace: &str, field: &str, handler: F) -> GatewayResult<Self>
    where
        F: Fn(Value, Args, ResolverContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ResolverResult<Value>> + Send + 'static,
    {
        if self.config.strict_registration {
            self.registry.try_add(namespace, field, handler)?;
        } else {
            self.registry.add(namespace, field, handler);
        }
        Ok(self)
    }

    /// Install the authorizer
    pub fn authorizer(mut self, authorizer: impl Authorizer + 'static) -> Self {
        self.registry = self.registry.with_authorizer(authorizer);
        self
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Render the schema and freeze the resolver map
    pub fn finish(mut self) -> GatewayResult<Gateway> {
        let sdl = self.compiler.render().to_string();
        let skipped = self.compiler.skipped_columns().to_vec();
        let resolvers = self.registry.get_resolvers();

        if self.config.validate_resolvers {
            resolvers.validate_against(self.compiler.model())?;
        }

        let model = self.compiler.into_model();
        info!(
            types = model.types.len(),
            inputs = model.inputs.len(),
            resolvers = resolvers.len(),
            skipped = skipped.len(),
            "gateway assembled"
        );

        Ok(Gateway {
            sdl,
            model,
            skipped,
            resolvers,
        })
    }
}

/// Serving phase: rendered SDL plus the guarded resolver map
#[derive(Debug, Clone)]
pub struct Gateway {
    sdl: String,
    model: SchemaModel,
    skipped: Vec<SkippedColumn>,
    resolvers: ResolverMap,
}

impl Gateway {
    /// Shortcut for a builder with no manual overrides
    pub fn build(driver: Arc<dyn Driver>, config: GatewayConfig) -> GatewayResult<Self> {
        GatewayBuilder::new(driver, config)?.finish()
    }

    /// Schema definition text
    pub fn sdl(&self) -> &str {
        &self.sdl
    }

    pub fn model(&self) -> &SchemaModel {
        &self.model
    }

    /// Columns omitted because their type could not be mapped
    pub fn skipped_columns(&self) -> &[SkippedColumn] {
        &self.skipped
    }

    pub fn resolvers(&self) -> &ResolverMap {
        &self.resolvers
    }

    /// Swap the authorizer while serving
    pub fn set_authorizer(&self, authorizer: impl Authorizer + 'static) {
        self.resolvers.set_authorizer(authorizer);
    }

    /// Resolve one field through the authorization pipeline
    pub async fn resolve(
        &self,
        namespace: &str,
        field: &str,
        parent: Value,
        args: Args,
        request: RequestContext,
    ) -> ResolverResult<Value> {
        self.resolvers
            .resolve(namespace, field, parent, args, request)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{ColumnMeta, InMemoryDriver, TableMetadata};
    use crate::schema::STRING;
    use serde_json::json;

    fn create_driver() -> Arc<InMemoryDriver> {
        let meta = TableMetadata::new("foo")
            .column(ColumnMeta::new("id", "serial"))
            .column(ColumnMeta::new("blob", "bytea"));
        Arc::new(InMemoryDriver::new().with_table(meta, "id"))
    }

    #[test]
    fn test_build_reports_skipped_columns() {
        let gateway = Gateway::build(create_driver(), GatewayConfig::default()).unwrap();
        assert!(gateway.sdl().contains("type Foo {"));
        assert!(!gateway.sdl().contains("blob"));
        assert_eq!(gateway.skipped_columns().len(), 2);
        assert!(gateway.resolvers().contains("Query", "fooGetPage"));
    }

    #[test]
    fn test_unknown_resolver_rejected_on_finish() {
        let err = GatewayBuilder::new(create_driver(), GatewayConfig::default())
            .unwrap()
            .resolver("Query", "nothing", |_, _, _| async { Ok(Value::Null) })
            .unwrap()
            .finish()
            .unwrap_err();
        assert_eq!(err.code(), "RELGRAPH_UNKNOWN_FIELD");
    }

    #[test]
    fn test_validation_can_be_disabled() {
        let config = GatewayConfig {
            validate_resolvers: false,
            ..Default::default()
        };
        let gateway = GatewayBuilder::new(create_driver(), config)
            .unwrap()
            .resolver("Query", "nothing", |_, _, _| async { Ok(Value::Null) })
            .unwrap()
            .finish()
            .unwrap();
        assert!(gateway.resolvers().contains("Query", "nothing"));
    }

    #[test]
    fn test_strict_registration() {
        let result = GatewayBuilder::new(create_driver(), GatewayConfig::strict())
            .unwrap()
            .resolver("Query", "fooGetFirst", |_, _, _| async { Ok(Value::Null) });
        assert!(matches!(
            result,
            Err(GatewayError::Resolver(ResolverError::DuplicateResolver { .. }))
        ));
    }

    #[tokio::test]
    async fn test_manual_field_and_resolver() {
        let gateway = GatewayBuilder::new(create_driver(), GatewayConfig::default())
            .unwrap()
            .field("Query", FieldDef::new("version", TypeRef::named(STRING)))
            .resolver("Query", "version", |_, _, _| async { Ok(json!("1.0")) })
            .unwrap()
            .finish()
            .unwrap();

        assert!(gateway.sdl().contains("  version: String\n"));
        let value = gateway
            .resolve("Query", "version", Value::Null, Args::new(), RequestContext::new())
            .await
            .unwrap();
        assert_eq!(value, json!("1.0"));
    }

    #[test]
    fn test_from_config_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"strict_registration": true, "default_page_limit": 10}"#)
            .unwrap();

        let builder = GatewayBuilder::from_config_file(create_driver(), file.path()).unwrap();
        assert!(builder.config().strict_registration);
        assert_eq!(builder.config().default_page_limit, Some(10));

        let dir = tempfile::tempdir().unwrap();
        let err = GatewayBuilder::from_config_file(create_driver(), &dir.path().join("none.json"))
            .err()
            .unwrap();
        assert_eq!(err.code(), "RELGRAPH_CONFIG_IO");
    }

    #[test]
    fn test_manual_input_field() {
        let gateway = GatewayBuilder::new(create_driver(), GatewayConfig::default())
            .unwrap()
            .input_field("FooInput", "blob", TypeRef::named(STRING))
            .finish()
            .unwrap();

        assert!(gateway.sdl().contains("input FooInput {\n  id: Int\n  blob: String\n}"));
        assert_eq!(
            gateway.model().input_fields("FooInput").unwrap()["blob"],
            TypeRef::named(STRING)
        );
    }
}
