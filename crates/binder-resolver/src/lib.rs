//! Service binding reference resolution
//!
//! Resolves the references declared by a binding into concrete cluster
//! state: REST mappings for arbitrary kinds, workload injection templates,
//! workload objects by name or selector, and binding Secret names.
//!
//! All lookups go through [`ClusterAccess`], which production code backs
//! with a kube client ([`KubeClusterAccess`]).

#![deny(missing_docs)]

pub mod cluster;
pub mod error;
pub mod resolver;
pub mod schema;
pub mod selector;

pub use cluster::{AccessError, ClusterAccess, KubeClusterAccess};
pub use error::ResolveError;
pub use resolver::{workload_mapping_name, ClusterResolver, MappingSource, Resolver};
pub use schema::{SchemaMapping, Scope};
pub use selector::{Selector, SelectorError};
