//! Resolver subsystem
//!
//! Registration and guarded invocation of field resolvers, plus synthesis
//! of the default CRUD and relation resolvers from driver metadata.
//!
//! # Invocation pipeline
//!
//! 1. Build a [`ResolverContext`] from the caller's request data, the
//!    resolver map and the driver
//! 2. Ask the active [`Authorizer`] to validate the call
//! 3. On rejection return the authorizer's `rejected` value
//! 4. Otherwise await the registered handler

mod auth;
mod context;
mod crud;
mod errors;
mod registry;
mod synth;

pub use auth::{AllowAll, AuthFuture, AuthRequest, Authorizer, FnAuthorizer};
pub use context::{RequestContext, ResolverContext};
pub use crud::{empty_page, fetch_first_of, fetch_page, get_first_of, get_page, put_item};
pub use errors::{ResolverError, ResolverResult};
pub use registry::{
    GuardedResolver, Handler, ResolverFuture, ResolverKey, ResolverMap, ResolverRegistry,
};
pub use synth::{register_table, synthesize};
