//! CLI commands

use clap::Args;
use kube::core::GroupVersionKind;

use binder_common::crd::ResourceReference;
use binder_common::kube_utils::parse_api_version;

pub mod mapping;
pub mod output;
pub mod schema;
pub mod secret;
pub mod workloads;

/// Kind of the object a command works on
#[derive(Args, Debug, Clone)]
pub struct KindArgs {
    /// API version of the kind, e.g. apps/v1 or v1
    #[arg(long)]
    pub api_version: String,

    /// Kind name, e.g. Deployment
    #[arg(long)]
    pub kind: String,
}

impl KindArgs {
    /// Group/version/kind named by the flags
    pub fn gvk(&self) -> GroupVersionKind {
        let (group, version) = parse_api_version(&self.api_version);
        GroupVersionKind::gvk(&group, &version, &self.kind)
    }

    /// Reference to an object of this kind
    pub fn reference(&self, namespace: &str, name: &str) -> ResourceReference {
        ResourceReference::new(&self.api_version, &self.kind)
            .in_namespace(namespace)
            .named(name)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use async_trait::async_trait;
    use kube::api::DynamicObject;
    use kube::core::{GroupVersionKind, GroupVersionResource};
    use mockall::mock;

    use binder_common::crd::ClusterWorkloadResourceMappingSpec;
    use binder_resolver::{MappingSource, ResolveError, SchemaMapping};

    // Local mock since the resolver crate only mocks its cluster access
    mock! {
        pub MappingSource {}

        #[async_trait]
        impl MappingSource for MappingSource {
            async fn lookup_rest_mapping(
                &self,
                obj: &DynamicObject,
            ) -> Result<SchemaMapping, ResolveError>;
            async fn lookup_schema_mapping(
                &self,
                gvk: &GroupVersionKind,
            ) -> Result<SchemaMapping, ResolveError>;
            async fn lookup_workload_mapping(
                &self,
                gvr: &GroupVersionResource,
            ) -> Result<ClusterWorkloadResourceMappingSpec, ResolveError>;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grouped_kind_splits_api_version() {
        let args = KindArgs {
            api_version: "apps/v1".to_string(),
            kind: "Deployment".to_string(),
        };
        let gvk = args.gvk();
        assert_eq!(gvk.group, "apps");
        assert_eq!(gvk.version, "v1");
        assert_eq!(gvk.kind, "Deployment");
    }

    #[test]
    fn core_kind_has_empty_group() {
        let args = KindArgs {
            api_version: "v1".to_string(),
            kind: "Secret".to_string(),
        };
        assert_eq!(args.gvk().group, "");
        let reference = args.reference("default", "creds");
        assert!(reference.is_secret());
        assert_eq!(reference.namespace, "default");
        assert_eq!(reference.name, "creds");
    }
}
