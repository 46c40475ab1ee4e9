//! Resource types read by the resolver
//!
//! The ClusterWorkloadResourceMapping CRD, the ProvisionedService duck type
//! and the reference type used to point at services and workloads.

mod provisioned_service;
mod types;
mod workload_mapping;

pub use provisioned_service::{
    BindingSecretReference, ProvisionedService, ProvisionedServiceStatus,
};
pub use types::{ResourceReference, CORE_API_VERSION, SECRET_KIND};
pub use workload_mapping::{
    ClusterWorkloadResourceMapping, ClusterWorkloadResourceMappingContainer,
    ClusterWorkloadResourceMappingSpec, ClusterWorkloadResourceMappingTemplate,
    DEFAULT_ANNOTATIONS_PATH, DEFAULT_CONTAINERS_PATH, DEFAULT_CONTAINER_NAME_PATH,
    DEFAULT_ENV_PATH, DEFAULT_INIT_CONTAINERS_PATH, DEFAULT_VOLUMES_PATH,
    DEFAULT_VOLUME_MOUNTS_PATH, WILDCARD_VERSION,
};
