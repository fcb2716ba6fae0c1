//! # Resolver Authorization
//!
//! Every resolver invocation passes through one active [`Authorizer`]: a
//! `validate` check and a `rejected` fallback forming an immutable pair.
//! Reconfiguration swaps the whole pair at once; calls already past the
//! check are unaffected.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, RwLock};

use serde_json::Value;

use super::context::ResolverContext;
use super::errors::ResolverResult;
use crate::expr::Args;

/// Future returned by authorizer hooks
pub type AuthFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The invocation being authorized
pub struct AuthRequest<'a> {
    /// Type owning the field (`Query`, `Mutation`, or an object type)
    pub namespace: &'a str,

    /// Field being resolved
    pub field: &'a str,

    /// Parent value (null at the root)
    pub parent: &'a Value,

    /// Raw field arguments
    pub args: &'a Args,

    /// Enriched execution context
    pub context: &'a ResolverContext,
}

/// Authorization hook pair
pub trait Authorizer: Send + Sync {
    /// Decide whether the handler may run
    fn validate<'a>(&'a self, request: &'a AuthRequest<'a>) -> AuthFuture<'a, bool>;

    /// Value returned in place of the handler's when `validate` says no
    fn rejected<'a>(&'a self, _request: &'a AuthRequest<'a>) -> AuthFuture<'a, ResolverResult<Value>> {
        Box::pin(async { Ok(Value::Null) })
    }
}

/// Default authorizer: everything is allowed
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl Authorizer for AllowAll {
    fn validate<'a>(&'a self, _request: &'a AuthRequest<'a>) -> AuthFuture<'a, bool> {
        Box::pin(async { true })
    }
}

type ValidatorFn = Box<dyn Fn(&AuthRequest<'_>) -> bool + Send + Sync>;
type RejectedFn = Box<dyn Fn(&AuthRequest<'_>) -> ResolverResult<Value> + Send + Sync>;

/// Authorizer built from synchronous closures
pub struct FnAuthorizer {
    validator: ValidatorFn,
    rejected: RejectedFn,
}

impl FnAuthorizer {
    /// Create from a validator; rejection yields null
    pub fn new(validator: impl Fn(&AuthRequest<'_>) -> bool + Send + Sync + 'static) -> Self {
        Self {
            validator: Box::new(validator),
            rejected: Box::new(null_rejected),
        }
    }

    /// Replace the rejection callback
    pub fn with_rejected(
        mut self,
        rejected: impl Fn(&AuthRequest<'_>) -> ResolverResult<Value> + Send + Sync + 'static,
    ) -> Self {
        self.rejected = Box::new(rejected);
        self
    }
}

fn null_rejected(_request: &AuthRequest<'_>) -> ResolverResult<Value> {
    Ok(Value::Null)
}

impl Authorizer for FnAuthorizer {
    fn validate<'a>(&'a self, request: &'a AuthRequest<'a>) -> AuthFuture<'a, bool> {
        let allowed = (self.validator)(request);
        Box::pin(async move { allowed })
    }

    fn rejected<'a>(&'a self, request: &'a AuthRequest<'a>) -> AuthFuture<'a, ResolverResult<Value>> {
        let result = (self.rejected)(request);
        Box::pin(async move { result })
    }
}

/// Shared slot holding the active authorizer
pub(crate) struct AuthSlot {
    current: RwLock<Arc<dyn Authorizer>>,
}

impl AuthSlot {
    pub(crate) fn new(authorizer: Arc<dyn Authorizer>) -> Self {
        Self {
            current: RwLock::new(authorizer),
        }
    }

    /// The authorizer in effect right now
    pub(crate) fn current(&self) -> Arc<dyn Authorizer> {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Swap in a new authorizer
    pub(crate) fn replace(&self, authorizer: Arc<dyn Authorizer>) {
        match self.current.write() {
            Ok(mut guard) => *guard = authorizer,
            Err(poisoned) => *poisoned.into_inner() = authorizer,
        }
    }
}

impl Default for AuthSlot {
    fn default() -> Self {
        Self::new(Arc::new(AllowAll))
    }
}
