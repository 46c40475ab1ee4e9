//! Reference types shared by bindings

use k8s_openapi::api::core::v1::ObjectReference;
use kube::core::GroupVersionKind;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::kube_utils::parse_api_version;

/// apiVersion of core resources such as Secret
pub const CORE_API_VERSION: &str = "v1";

/// Kind of the core Secret resource
pub const SECRET_KIND: &str = "Secret";

/// A typed pointer to a resource by apiVersion, kind, namespace and name
///
/// An empty `name` means the referent is selected by labels rather than by
/// identity.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct ResourceReference {
    /// Group and version, e.g. "apps/v1" or "v1" for the core group
    pub api_version: String,
    /// Resource kind, e.g. "Deployment"
    pub kind: String,
    /// Namespace of the referent (empty for cluster-scoped kinds)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    /// Name of the referent (empty to resolve by selector)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

impl ResourceReference {
    /// Create a reference to a kind, without namespace or name
    pub fn new(api_version: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            api_version: api_version.into(),
            kind: kind.into(),
            ..Default::default()
        }
    }

    /// Set the namespace
    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set the name
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// API group, empty for the core group
    pub fn group(&self) -> String {
        parse_api_version(&self.api_version).0
    }

    /// API version within the group
    pub fn version(&self) -> String {
        parse_api_version(&self.api_version).1
    }

    /// Group, version and kind of the referent
    pub fn gvk(&self) -> GroupVersionKind {
        let (group, version) = parse_api_version(&self.api_version);
        GroupVersionKind::gvk(&group, &version, &self.kind)
    }

    /// True when this reference points directly at a core Secret
    pub fn is_secret(&self) -> bool {
        self.api_version == CORE_API_VERSION && self.kind == SECRET_KIND
    }
}

impl std::fmt::Display for ResourceReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.api_version, self.kind)?;
        match (self.namespace.is_empty(), self.name.is_empty()) {
            (_, true) => Ok(()),
            (true, false) => write!(f, " {}", self.name),
            (false, false) => write!(f, " {}/{}", self.namespace, self.name),
        }
    }
}

impl From<ObjectReference> for ResourceReference {
    fn from(r: ObjectReference) -> Self {
        Self {
            api_version: r.api_version.unwrap_or_default(),
            kind: r.kind.unwrap_or_default(),
            namespace: r.namespace.unwrap_or_default(),
            name: r.name.unwrap_or_default(),
        }
    }
}

impl From<&ResourceReference> for ObjectReference {
    fn from(r: &ResourceReference) -> Self {
        fn non_empty(s: &str) -> Option<String> {
            (!s.is_empty()).then(|| s.to_string())
        }
        ObjectReference {
            api_version: non_empty(&r.api_version),
            kind: non_empty(&r.kind),
            namespace: non_empty(&r.namespace),
            name: non_empty(&r.name),
            ..Default::default()
        }
    }
}
