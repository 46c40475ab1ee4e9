//! Reference resolution for service bindings
//!
//! A binding names a service and one or more workloads. Before anything can
//! be projected, the references are resolved against cluster state:
//! - the kind of a workload to its REST mapping
//! - a workload resource to the template describing where values go
//! - a workload reference or selector to concrete workload objects
//! - a service reference to the name of its binding Secret
//!
//! Every call is an independent point-in-time read; nothing is cached.

use async_trait::async_trait;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::api::DynamicObject;
use kube::core::{GroupVersionKind, GroupVersionResource};
use kube::Client;
use tracing::{debug, instrument};

use binder_common::crd::{
    ClusterWorkloadResourceMapping, ClusterWorkloadResourceMappingSpec, ProvisionedService,
    ResourceReference,
};
use binder_common::kube_utils::parse_api_version;

use crate::cluster::{format_gvk, AccessError, ClusterAccess, KubeClusterAccess};
use crate::error::ResolveError;
use crate::schema::SchemaMapping;
use crate::selector::Selector;

/// Name of the ClusterWorkloadResourceMapping for a resource
///
/// The key is `{resource}.{group}`, e.g. `deployments.apps`.
pub fn workload_mapping_name(gvr: &GroupVersionResource) -> String {
    format!("{}.{}", gvr.resource, gvr.group)
}

/// Lookups describing the structure of workload kinds
#[async_trait]
pub trait MappingSource: Send + Sync {
    /// REST mapping for the type of an existing object
    async fn lookup_rest_mapping(&self, obj: &DynamicObject)
        -> Result<SchemaMapping, ResolveError>;

    /// REST mapping for a kind
    async fn lookup_schema_mapping(
        &self,
        gvk: &GroupVersionKind,
    ) -> Result<SchemaMapping, ResolveError>;

    /// Injection template for a workload resource, with every path defaulted
    ///
    /// The full ordered version list is returned; picking the entry for a
    /// runtime version is left to the caller, with the `*` entry as the
    /// fallback of last resort.
    async fn lookup_workload_mapping(
        &self,
        gvr: &GroupVersionResource,
    ) -> Result<ClusterWorkloadResourceMappingSpec, ResolveError>;
}

/// Lookups resolving the two sides of a binding
#[async_trait]
pub trait Resolver: MappingSource {
    /// Name of the Secret exposed by a service
    ///
    /// An empty string means the service exists but has not published a
    /// Secret yet.
    async fn lookup_binding_secret(
        &self,
        service_ref: &ResourceReference,
    ) -> Result<String, ResolveError>;

    /// Workloads matching a reference
    ///
    /// A named reference yields exactly one workload and ignores the
    /// selector. An unnamed reference lists by selector and may yield none.
    async fn lookup_workloads(
        &self,
        workload_ref: &ResourceReference,
        selector: Option<&LabelSelector>,
    ) -> Result<Vec<DynamicObject>, ResolveError>;
}

/// Resolver backed by a [`ClusterAccess`]
pub struct ClusterResolver<C> {
    cluster: C,
}

impl ClusterResolver<KubeClusterAccess> {
    /// Create a resolver talking to the API server through `client`
    pub fn from_client(client: Client) -> Self {
        Self::new(KubeClusterAccess::new(client))
    }
}

impl<C: ClusterAccess> ClusterResolver<C> {
    /// Create a resolver over the given cluster access
    pub fn new(cluster: C) -> Self {
        Self { cluster }
    }

    async fn discover(&self, gvk: &GroupVersionKind) -> Result<SchemaMapping, ResolveError> {
        self.cluster
            .discover_mapping(gvk)
            .await
            .map_err(|e| ResolveError::from_discovery(e, format_gvk(gvk)))
    }

    async fn lookup_workload(
        &self,
        mapping: &SchemaMapping,
        workload_ref: &ResourceReference,
    ) -> Result<DynamicObject, ResolveError> {
        self.cluster
            .get(mapping, &workload_ref.namespace, &workload_ref.name)
            .await
            .map_err(|e| match e {
                AccessError::NotFound { .. } => ResolveError::WorkloadNotFound {
                    kind: workload_ref.kind.clone(),
                    namespace: workload_ref.namespace.clone(),
                    name: workload_ref.name.clone(),
                },
                other => {
                    ResolveError::lookup_failed(&workload_ref.kind, &workload_ref.name, other)
                }
            })
    }

    async fn list_workloads(
        &self,
        mapping: &SchemaMapping,
        workload_ref: &ResourceReference,
        selector: Option<&LabelSelector>,
    ) -> Result<Vec<DynamicObject>, ResolveError> {
        let selector = Selector::from_label_selector(selector)?;
        if selector.is_nothing() {
            debug!(kind = %workload_ref.kind, "no selector, no workloads");
            return Ok(Vec::new());
        }
        self.cluster
            .list(mapping, &workload_ref.namespace, &selector)
            .await
            .map_err(|e| ResolveError::lookup_failed(&workload_ref.kind, "", e))
    }
}

#[async_trait]
impl<C: ClusterAccess> MappingSource for ClusterResolver<C> {
    #[instrument(
        skip(self, obj),
        fields(name = obj.metadata.name.as_deref().unwrap_or_default())
    )]
    async fn lookup_rest_mapping(
        &self,
        obj: &DynamicObject,
    ) -> Result<SchemaMapping, ResolveError> {
        let types = obj
            .types
            .as_ref()
            .filter(|t| !t.api_version.is_empty() && !t.kind.is_empty())
            .ok_or_else(|| ResolveError::MissingTypeMeta {
                name: obj.metadata.name.clone().unwrap_or_default(),
            })?;
        let (group, version) = parse_api_version(&types.api_version);
        self.discover(&GroupVersionKind::gvk(&group, &version, &types.kind))
            .await
    }

    #[instrument(skip(self, gvk), fields(gvk = %format_gvk(gvk)))]
    async fn lookup_schema_mapping(
        &self,
        gvk: &GroupVersionKind,
    ) -> Result<SchemaMapping, ResolveError> {
        self.discover(gvk).await
    }

    #[instrument(skip(self, gvr), fields(resource = %workload_mapping_name(gvr)))]
    async fn lookup_workload_mapping(
        &self,
        gvr: &GroupVersionResource,
    ) -> Result<ClusterWorkloadResourceMappingSpec, ResolveError> {
        let name = workload_mapping_name(gvr);
        let mapping = SchemaMapping::cluster_scoped::<ClusterWorkloadResourceMapping>();

        let spec = match self.cluster.get(&mapping, "", &name).await {
            Ok(obj) => decode_mapping_spec(&obj, &name)?,
            Err(AccessError::NotFound { .. }) => {
                debug!("no workload mapping configured, using defaults");
                ClusterWorkloadResourceMappingSpec::wildcard()
            }
            Err(e) => return Err(ResolveError::lookup_failed(&mapping.kind, &name, e)),
        };

        Ok(spec.defaulted())
    }
}

#[async_trait]
impl<C: ClusterAccess> Resolver for ClusterResolver<C> {
    #[instrument(skip(self, service_ref), fields(service = %service_ref))]
    async fn lookup_binding_secret(
        &self,
        service_ref: &ResourceReference,
    ) -> Result<String, ResolveError> {
        if service_ref.is_secret() {
            // direct secret reference
            return Ok(service_ref.name.clone());
        }

        let mapping = self.discover(&service_ref.gvk()).await?;
        let obj = self
            .cluster
            .get(&mapping, &service_ref.namespace, &service_ref.name)
            .await
            .map_err(|e| match e {
                AccessError::NotFound { .. } => ResolveError::ServiceNotFound {
                    kind: service_ref.kind.clone(),
                    namespace: service_ref.namespace.clone(),
                    name: service_ref.name.clone(),
                },
                AccessError::Decode { source, .. } => ResolveError::NotAProvisionedService {
                    kind: service_ref.kind.clone(),
                    name: service_ref.name.clone(),
                    message: source.to_string(),
                },
                other => ResolveError::lookup_failed(&service_ref.kind, &service_ref.name, other),
            })?;

        let service = ProvisionedService::from_dynamic(&obj).map_err(|e| {
            ResolveError::NotAProvisionedService {
                kind: service_ref.kind.clone(),
                name: service_ref.name.clone(),
                message: e.to_string(),
            }
        })?;

        let secret = service.binding_secret_name();
        if secret.is_empty() {
            debug!("service has not published a binding secret yet");
        }
        Ok(secret.to_string())
    }

    #[instrument(
        skip(self, workload_ref, selector),
        fields(workload = %workload_ref)
    )]
    async fn lookup_workloads(
        &self,
        workload_ref: &ResourceReference,
        selector: Option<&LabelSelector>,
    ) -> Result<Vec<DynamicObject>, ResolveError> {
        let mapping = self.discover(&workload_ref.gvk()).await?;
        if !workload_ref.name.is_empty() {
            let workload = self.lookup_workload(&mapping, workload_ref).await?;
            return Ok(vec![workload]);
        }
        self.list_workloads(&mapping, workload_ref, selector).await
    }
}

fn decode_mapping_spec(
    obj: &DynamicObject,
    name: &str,
) -> Result<ClusterWorkloadResourceMappingSpec, ResolveError> {
    let spec = obj
        .data
        .get("spec")
        .cloned()
        .unwrap_or_else(|| serde_json::json!({}));
    serde_json::from_value(spec).map_err(|source| {
        ResolveError::lookup_failed(
            "ClusterWorkloadResourceMapping",
            name,
            AccessError::Decode {
                kind: "ClusterWorkloadResourceMapping".to_string(),
                name: name.to_string(),
                source,
            },
        )
    })
}
