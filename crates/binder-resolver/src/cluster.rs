//! Cluster access for the resolver
//!
//! Provides a trait-based abstraction over the three reads the resolver
//! needs (discover, get, list), so tests can mock the API server while
//! production code talks to it through kube-rs dynamic APIs.

use async_trait::async_trait;
use kube::api::{Api, DynamicObject, ListParams};
use kube::core::GroupVersionKind;
use kube::error::DiscoveryError;
use kube::Client;
use tracing::{debug, trace};

#[cfg(test)]
use mockall::automock;

use crate::schema::{Scope, SchemaMapping};
use crate::selector::Selector;

/// Failure reading cluster state
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    /// The requested object does not exist
    #[error("{kind} {name} not found")]
    NotFound {
        /// Kind of the missing object
        kind: String,
        /// Name of the missing object
        name: String,
    },

    /// The kind is not served by the cluster
    #[error("kind {gvk} is not registered: {message}")]
    UnknownKind {
        /// Group/version/kind that was looked up
        gvk: String,
        /// Detail from discovery
        message: String,
    },

    /// Type discovery could not be completed
    #[error("API discovery failed: {message}")]
    Discovery {
        /// Description of what failed
        message: String,
    },

    /// The object exists but could not be decoded
    #[error("failed to decode {kind} {name}: {source}")]
    Decode {
        /// Kind of the object
        kind: String,
        /// Name of the object
        name: String,
        /// Underlying decode error
        source: serde_json::Error,
    },

    /// Any other API server error
    #[error("kubernetes error: {source}")]
    Api {
        /// The underlying kube-rs error
        #[from]
        source: kube::Error,
    },
}

impl AccessError {
    /// Classify a kube error from a get, turning 404 into `NotFound`
    pub fn from_kube(err: kube::Error, kind: &str, name: &str) -> Self {
        match err {
            kube::Error::Api(ae) if ae.code == 404 => Self::NotFound {
                kind: kind.to_string(),
                name: name.to_string(),
            },
            other => Self::Api { source: other },
        }
    }

    /// Classify a kube error from discovery
    pub fn from_discovery(err: kube::Error, gvk: &GroupVersionKind) -> Self {
        let gvk = format_gvk(gvk);
        match err {
            kube::Error::Discovery(
                e @ (DiscoveryError::MissingKind(_)
                | DiscoveryError::MissingApiGroup(_)
                | DiscoveryError::MissingResource(_)),
            ) => Self::UnknownKind {
                gvk,
                message: e.to_string(),
            },
            kube::Error::Api(ae) if ae.code == 404 => Self::UnknownKind {
                gvk,
                message: ae.message,
            },
            other => Self::Discovery {
                message: format!("{gvk}: {other}"),
            },
        }
    }

    /// True when the object does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Render a GVK as `group/version/Kind` (`version/Kind` for the core group)
pub fn format_gvk(gvk: &GroupVersionKind) -> String {
    if gvk.group.is_empty() {
        format!("{}/{}", gvk.version, gvk.kind)
    } else {
        format!("{}/{}/{}", gvk.group, gvk.version, gvk.kind)
    }
}

/// Trait abstracting the cluster reads the resolver performs
///
/// Implementations must be safe for concurrent use; the resolver holds no
/// state of its own.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ClusterAccess: Send + Sync {
    /// Resolve a kind to its REST mapping
    async fn discover_mapping(&self, gvk: &GroupVersionKind)
        -> Result<SchemaMapping, AccessError>;

    /// Get one object by name
    ///
    /// `namespace` is ignored for cluster-scoped mappings.
    async fn get(
        &self,
        mapping: &SchemaMapping,
        namespace: &str,
        name: &str,
    ) -> Result<DynamicObject, AccessError>;

    /// List objects matching a selector, in listing order
    ///
    /// `namespace` is ignored for cluster-scoped mappings.
    async fn list(
        &self,
        mapping: &SchemaMapping,
        namespace: &str,
        selector: &Selector,
    ) -> Result<Vec<DynamicObject>, AccessError>;
}

/// Cluster access backed by a kube client
#[derive(Clone)]
pub struct KubeClusterAccess {
    client: Client,
}

impl KubeClusterAccess {
    /// Create a new KubeClusterAccess wrapping the given client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Dynamic API for a mapping
    ///
    /// An empty namespace on a namespaced kind falls back to the client's
    /// default namespace.
    fn api(&self, mapping: &SchemaMapping, namespace: &str) -> Api<DynamicObject> {
        let ar = mapping.api_resource();
        match mapping.scope {
            Scope::Cluster => Api::all_with(self.client.clone(), &ar),
            Scope::Namespaced if namespace.is_empty() => {
                Api::default_namespaced_with(self.client.clone(), &ar)
            }
            Scope::Namespaced => Api::namespaced_with(self.client.clone(), namespace, &ar),
        }
    }
}

#[async_trait]
impl ClusterAccess for KubeClusterAccess {
    async fn discover_mapping(
        &self,
        gvk: &GroupVersionKind,
    ) -> Result<SchemaMapping, AccessError> {
        let (ar, caps) = kube::discovery::oneshot::pinned_kind(&self.client, gvk)
            .await
            .map_err(|e| AccessError::from_discovery(e, gvk))?;
        trace!(gvk = %format_gvk(gvk), plural = %ar.plural, "discovered kind");
        Ok(SchemaMapping::from_discovery(&ar, &caps))
    }

    async fn get(
        &self,
        mapping: &SchemaMapping,
        namespace: &str,
        name: &str,
    ) -> Result<DynamicObject, AccessError> {
        self.api(mapping, namespace)
            .get(name)
            .await
            .map_err(|e| AccessError::from_kube(e, &mapping.kind, name))
    }

    async fn list(
        &self,
        mapping: &SchemaMapping,
        namespace: &str,
        selector: &Selector,
    ) -> Result<Vec<DynamicObject>, AccessError> {
        if selector.is_nothing() {
            return Ok(Vec::new());
        }
        let mut params = ListParams::default();
        if !selector.is_everything() {
            params = params.labels(&selector.to_string());
        }
        let list = self.api(mapping, namespace).list(&params).await?;
        debug!(
            kind = %mapping.kind,
            namespace = %namespace,
            selector = %selector,
            count = list.items.len(),
            "listed objects"
        );
        Ok(list.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(code: u16) -> kube::Error {
        kube::Error::Api(kube::core::ErrorResponse {
            status: "Failure".to_string(),
            message: "the server could not find the requested resource".to_string(),
            reason: "NotFound".to_string(),
            code,
        })
    }

    #[test]
    fn get_404_is_not_found() {
        let err = AccessError::from_kube(api_error(404), "Deployment", "web");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Deployment web not found");
    }

    #[test]
    fn get_other_status_is_api_error() {
        let err = AccessError::from_kube(api_error(500), "Deployment", "web");
        assert!(matches!(err, AccessError::Api { .. }));
    }

    #[test]
    fn discovery_missing_kind_is_unknown_kind() {
        let gvk = GroupVersionKind::gvk("db.example", "v1", "MyDatabase");
        let err = AccessError::from_discovery(
            kube::Error::Discovery(DiscoveryError::MissingKind("MyDatabase".to_string())),
            &gvk,
        );
        match err {
            AccessError::UnknownKind { gvk, .. } => assert_eq!(gvk, "db.example/v1/MyDatabase"),
            other => panic!("expected UnknownKind, got {other:?}"),
        }
    }

    #[test]
    fn discovery_404_is_unknown_kind() {
        let gvk = GroupVersionKind::gvk("db.example", "v9", "MyDatabase");
        let err = AccessError::from_discovery(api_error(404), &gvk);
        assert!(matches!(err, AccessError::UnknownKind { .. }));
    }

    #[test]
    fn discovery_server_error_is_transient() {
        let gvk = GroupVersionKind::gvk("apps", "v1", "Deployment");
        let err = AccessError::from_discovery(api_error(503), &gvk);
        match err {
            AccessError::Discovery { message } => {
                assert!(message.starts_with("apps/v1/Deployment"))
            }
            other => panic!("expected Discovery, got {other:?}"),
        }
    }

    #[test]
    fn core_gvk_formats_without_group() {
        let gvk = GroupVersionKind::gvk("", "v1", "Secret");
        assert_eq!(format_gvk(&gvk), "v1/Secret");
    }
}
