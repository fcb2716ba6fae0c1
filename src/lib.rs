//! relgraph - A graph query gateway over relational metadata
//!
//! Compiles driver table metadata into a schema definition and synthesizes
//! the resolvers that serve it: CRUD per table plus relation traversal along
//! foreign keys in both directions.

pub mod config;
pub mod driver;
pub mod expr;
pub mod gateway;
pub mod naming;
pub mod resolver;
pub mod schema;

pub use config::{ConfigError, GatewayConfig};
pub use driver::{Driver, DriverError, InMemoryDriver, TableMetadata};
pub use gateway::{Gateway, GatewayBuilder, GatewayError};
pub use resolver::{Authorizer, RequestContext, ResolverError, ResolverMap, ResolverRegistry};
pub use schema::{SchemaCompiler, SchemaModel};
