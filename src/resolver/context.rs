//! Resolver Context
//!
//! Context handed to every resolver invocation. Carries the caller's
//! request data plus the resolver map and driver the pipeline enriches it with.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use super::registry::ResolverMap;
use crate::driver::Driver;

/// Caller-supplied request data
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Request ID for tracing
    pub request_id: Uuid,

    /// Identity claims for authorization
    pub claims: HashMap<String, Value>,

    /// Free-form metadata from the transport
    pub metadata: HashMap<String, Value>,
}

impl RequestContext {
    /// Create an empty request context
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            claims: HashMap::new(),
            metadata: HashMap::new(),
        }
    }

    /// Add a claim
    pub fn with_claim(mut self, key: impl Into<String>, value: Value) -> Self {
        self.claims.insert(key.into(), value);
        self
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn claim(&self, key: &str) -> Option<&Value> {
        self.claims.get(key)
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Execution context seen by resolvers
#[derive(Clone)]
pub struct ResolverContext {
    /// Caller request data
    pub request: RequestContext,

    /// Full resolver map
    pub resolvers: ResolverMap,

    /// Database collaborator
    pub db: Arc<dyn Driver>,
}

impl ResolverContext {
    pub fn new(request: RequestContext, resolvers: ResolverMap, db: Arc<dyn Driver>) -> Self {
        Self {
            request,
            resolvers,
            db,
        }
    }

    /// Page limit applied when the caller gives none
    pub fn default_page_limit(&self) -> Option<u64> {
        self.resolvers.default_page_limit()
    }
}
