//! Structural mapping of a resource kind to its REST resource

use kube::core::{GroupVersionKind, GroupVersionResource};
use kube::discovery::{ApiCapabilities, ApiResource};
use kube::Resource;
use serde::Serialize;

use binder_common::kube_utils::format_api_version;

/// Whether instances of a kind live in a namespace
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Scope {
    /// Instances are addressed by namespace and name
    Namespaced,
    /// Instances are addressed by name only
    Cluster,
}

impl From<&kube::discovery::Scope> for Scope {
    fn from(scope: &kube::discovery::Scope) -> Self {
        match scope {
            kube::discovery::Scope::Namespaced => Self::Namespaced,
            kube::discovery::Scope::Cluster => Self::Cluster,
        }
    }
}

/// Group, version, plural and scope of one kind, as served by the cluster
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SchemaMapping {
    /// API group, empty for the core group
    pub group: String,
    /// API version
    pub version: String,
    /// Kind
    pub kind: String,
    /// Plural resource name used in REST paths
    pub plural: String,
    /// Namespaced or cluster-scoped
    pub scope: Scope,
}

impl SchemaMapping {
    /// Build a mapping from discovery results
    pub fn from_discovery(resource: &ApiResource, capabilities: &ApiCapabilities) -> Self {
        Self {
            group: resource.group.clone(),
            version: resource.version.clone(),
            kind: resource.kind.clone(),
            plural: resource.plural.clone(),
            scope: (&capabilities.scope).into(),
        }
    }

    /// Mapping of a compile-time known cluster-scoped resource
    pub fn cluster_scoped<K>() -> Self
    where
        K: Resource<DynamicType = (), Scope = kube::core::ClusterResourceScope>,
    {
        Self {
            group: K::group(&()).into_owned(),
            version: K::version(&()).into_owned(),
            kind: K::kind(&()).into_owned(),
            plural: K::plural(&()).into_owned(),
            scope: Scope::Cluster,
        }
    }

    /// Full apiVersion string
    pub fn api_version(&self) -> String {
        format_api_version(&self.group, &self.version)
    }

    /// True when instances live in a namespace
    pub fn is_namespaced(&self) -> bool {
        self.scope == Scope::Namespaced
    }

    /// The mapping as a kube `ApiResource`, for building dynamic APIs
    pub fn api_resource(&self) -> ApiResource {
        ApiResource {
            group: self.group.clone(),
            version: self.version.clone(),
            api_version: self.api_version(),
            kind: self.kind.clone(),
            plural: self.plural.clone(),
        }
    }

    /// Group, version and kind
    pub fn gvk(&self) -> GroupVersionKind {
        GroupVersionKind::gvk(&self.group, &self.version, &self.kind)
    }

    /// Group, version and plural resource
    pub fn gvr(&self) -> GroupVersionResource {
        GroupVersionResource::gvr(&self.group, &self.version, &self.plural)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use binder_common::crd::ClusterWorkloadResourceMapping;

    #[test]
    fn cluster_scoped_mapping_of_workload_mapping_crd() {
        let mapping = SchemaMapping::cluster_scoped::<ClusterWorkloadResourceMapping>();
        assert_eq!(mapping.group, "servicebinding.io");
        assert_eq!(mapping.version, "v1beta1");
        assert_eq!(mapping.kind, "ClusterWorkloadResourceMapping");
        assert_eq!(mapping.plural, "clusterworkloadresourcemappings");
        assert!(!mapping.is_namespaced());
        assert_eq!(mapping.api_version(), "servicebinding.io/v1beta1");
    }

    #[test]
    fn core_group_api_version_is_bare() {
        let mapping = SchemaMapping {
            group: String::new(),
            version: "v1".to_string(),
            kind: "Pod".to_string(),
            plural: "pods".to_string(),
            scope: Scope::Namespaced,
        };
        assert_eq!(mapping.api_version(), "v1");
        let ar = mapping.api_resource();
        assert_eq!(ar.api_version, "v1");
        assert_eq!(ar.plural, "pods");
        assert_eq!(mapping.gvr().resource, "pods");
        assert_eq!(mapping.gvk().kind, "Pod");
    }
}
