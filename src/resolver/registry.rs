//! # Resolver Registry
//!
//! Maps `(namespace, field)` to resolver handlers. Handlers never run
//! directly: every invocation goes through the authorization pipeline in
//! [`ResolverMap::resolve`].
//!
//! Registration is last-write-wins. Use [`ResolverRegistry::try_add`] when
//! an existing key should be treated as a conflict.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use super::auth::{AuthRequest, AuthSlot, Authorizer};
use super::context::{RequestContext, ResolverContext};
use super::errors::{ResolverError, ResolverResult};
use crate::driver::Driver;
use crate::expr::Args;
use crate::schema::SchemaModel;

/// Future returned by a resolver handler
pub type ResolverFuture = Pin<Box<dyn Future<Output = ResolverResult<Value>> + Send>>;

/// A resolver handler: `(parent, args, context) -> value`
pub type Handler = Arc<dyn Fn(Value, Args, ResolverContext) -> ResolverFuture + Send + Sync>;

type Entries = IndexMap<String, IndexMap<String, Handler>>;

/// Registry key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResolverKey {
    pub namespace: String,
    pub field: String,
}

impl ResolverKey {
    pub fn new(namespace: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            field: field.into(),
        }
    }
}

impl fmt::Display for ResolverKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.field)
    }
}

/// Mutable registry used during the build phase
pub struct ResolverRegistry {
    /// Database collaborator passed to every resolver
    driver: Arc<dyn Driver>,

    /// Handlers by namespace, then field
    entries: Entries,

    /// Active authorizer, shared with every map handed out
    auth: Arc<AuthSlot>,

    /// Page limit applied when the caller gives none
    default_page_limit: Option<u64>,
}

impl ResolverRegistry {
    /// Create an empty registry with the allow-all authorizer
    pub fn new(driver: Arc<dyn Driver>) -> Self {
        Self {
            driver,
            entries: IndexMap::new(),
            auth: Arc::new(AuthSlot::default()),
            default_page_limit: None,
        }
    }

    /// Install the authorizer at construction
    pub fn with_authorizer(self, authorizer: impl Authorizer + 'static) -> Self {
        self.auth.replace(Arc::new(authorizer));
        self
    }

    /// Set the default page limit
    pub fn with_default_page_limit(mut self, limit: Option<u64>) -> Self {
        self.default_page_limit = limit;
        self
    }

    /// Swap the authorizer; affects maps already handed out
    pub fn set_authorizer(&self, authorizer: impl Authorizer + 'static) {
        self.auth.replace(Arc::new(authorizer));
    }

    /// Register a handler, replacing any existing one.
    ///
    /// Returns `true` if a previous handler was replaced.
    pub fn add<F, Fut>(&mut self, namespace: &str, field: &str, handler: F) -> bool
    where
        F: Fn(Value, Args, ResolverContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ResolverResult<Value>> + Send + 'static,
    {
        let handler: Handler = Arc::new(
            move |parent: Value, args: Args, ctx: ResolverContext| -> ResolverFuture {
                Box::pin(handler(parent, args, ctx))
            },
        );
        self.insert(namespace, field, handler)
    }

    /// Register a handler, failing if the key is taken
    pub fn try_add<F, Fut>(&mut self, namespace: &str, field: &str, handler: F) -> ResolverResult<()>
    where
        F: Fn(Value, Args, ResolverContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ResolverResult<Value>> + Send + 'static,
    {
        if self.contains(namespace, field) {
            return Err(ResolverError::DuplicateResolver {
                namespace: namespace.to_string(),
                field: field.to_string(),
            });
        }
        self.add(namespace, field, handler);
        Ok(())
    }

    fn insert(&mut self, namespace: &str, field: &str, handler: Handler) -> bool {
        let replaced = self
            .entries
            .entry(namespace.to_string())
            .or_default()
            .insert(field.to_string(), handler)
            .is_some();
        if replaced {
            debug!(namespace, field, "resolver replaced");
        }
        replaced
    }

    pub fn contains(&self, namespace: &str, field: &str) -> bool {
        self.entries
            .get(namespace)
            .map(|fields| fields.contains_key(field))
            .unwrap_or(false)
    }

    /// Number of registered handlers
    pub fn len(&self) -> usize {
        self.entries.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn keys(&self) -> Vec<ResolverKey> {
        collect_keys(&self.entries)
    }

    pub fn driver(&self) -> &Arc<dyn Driver> {
        &self.driver
    }

    /// Snapshot of every registered resolver
    pub fn get_resolvers(&self) -> ResolverMap {
        ResolverMap {
            inner: Arc::new(MapInner {
                entries: self.entries.clone(),
                driver: Arc::clone(&self.driver),
                auth: Arc::clone(&self.auth),
                default_page_limit: self.default_page_limit,
            }),
        }
    }
}

struct MapInner {
    entries: Entries,
    driver: Arc<dyn Driver>,
    auth: Arc<AuthSlot>,
    default_page_limit: Option<u64>,
}

/// Read-only resolver map handed to the execution engine
#[derive(Clone)]
pub struct ResolverMap {
    inner: Arc<MapInner>,
}

impl ResolverMap {
    pub fn contains(&self, namespace: &str, field: &str) -> bool {
        self.handler(namespace, field).is_some()
    }

    /// Namespaces in registration order
    pub fn namespaces(&self) -> Vec<&str> {
        self.inner.entries.keys().map(String::as_str).collect()
    }

    /// Fields of a namespace in registration order
    pub fn fields(&self, namespace: &str) -> Vec<&str> {
        self.inner
            .entries
            .get(namespace)
            .map(|fields| fields.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn keys(&self) -> Vec<ResolverKey> {
        collect_keys(&self.inner.entries)
    }

    pub fn len(&self) -> usize {
        self.inner.entries.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Guarded callable for one field
    pub fn get(&self, namespace: &str, field: &str) -> Option<GuardedResolver> {
        self.contains(namespace, field).then(|| GuardedResolver {
            map: self.clone(),
            namespace: namespace.to_string(),
            field: field.to_string(),
        })
    }

    /// Run one field through the authorization pipeline.
    ///
    /// The handler only runs if the active authorizer validates the call;
    /// otherwise the authorizer's `rejected` result is returned.
    pub async fn resolve(
        &self,
        namespace: &str,
        field: &str,
        parent: Value,
        args: Args,
        request: RequestContext,
    ) -> ResolverResult<Value> {
        let handler = self
            .handler(namespace, field)
            .ok_or_else(|| ResolverError::NotFound {
                namespace: namespace.to_string(),
                field: field.to_string(),
            })?;

        let context = ResolverContext::new(request, self.clone(), Arc::clone(&self.inner.driver));
        let authorizer = self.inner.auth.current();

        let auth_request = AuthRequest {
            namespace,
            field,
            parent: &parent,
            args: &args,
            context: &context,
        };
        if !authorizer.validate(&auth_request).await {
            debug!(
                namespace,
                field,
                request_id = %context.request.request_id,
                "resolver rejected"
            );
            return authorizer.rejected(&auth_request).await;
        }

        handler(parent, args, context).await
    }

    /// Reject keys that name no field of `model`
    pub fn validate_against(&self, model: &SchemaModel) -> ResolverResult<()> {
        for (namespace, fields) in &self.inner.entries {
            for field in fields.keys() {
                if !model.has_field(namespace, field) {
                    return Err(ResolverError::UnknownField {
                        namespace: namespace.clone(),
                        field: field.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Swap the authorizer for every holder of this map
    pub fn set_authorizer(&self, authorizer: impl Authorizer + 'static) {
        self.inner.auth.replace(Arc::new(authorizer));
    }

    pub fn default_page_limit(&self) -> Option<u64> {
        self.inner.default_page_limit
    }

    pub fn driver(&self) -> &Arc<dyn Driver> {
        &self.inner.driver
    }

    fn handler(&self, namespace: &str, field: &str) -> Option<Handler> {
        self.inner.entries.get(namespace)?.get(field).cloned()
    }
}

impl fmt::Debug for ResolverMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverMap")
            .field("keys", &self.keys())
            .finish()
    }
}

/// One field of a [`ResolverMap`], callable through the pipeline
#[derive(Clone, Debug)]
pub struct GuardedResolver {
    map: ResolverMap,
    namespace: String,
    field: String,
}

impl GuardedResolver {
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub async fn call(&self, parent: Value, args: Args, request: RequestContext) -> ResolverResult<Value> {
        self.map
            .resolve(&self.namespace, &self.field, parent, args, request)
            .await
    }
}

fn collect_keys(entries: &Entries) -> Vec<ResolverKey> {
    entries
        .iter()
        .flat_map(|(namespace, fields)| {
            fields
                .keys()
                .map(move |field| ResolverKey::new(namespace.as_str(), field.as_str()))
        })
        .collect()
}
