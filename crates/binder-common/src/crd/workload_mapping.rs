//! ClusterWorkloadResourceMapping CRD
//!
//! Describes where, inside a workload kind's document, binding values are
//! injected. One mapping exists per fully-qualified resource
//! (`{resource}.{group}`), with one template per workload version.

use std::collections::HashSet;

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Version matcher that applies to every version without an exact entry
pub const WILDCARD_VERSION: &str = "*";

/// Default location of the pod template annotations
pub const DEFAULT_ANNOTATIONS_PATH: &str = ".spec.template.metadata.annotations";
/// Default location of init containers
pub const DEFAULT_INIT_CONTAINERS_PATH: &str = ".spec.template.spec.initContainers[*]";
/// Default location of containers
pub const DEFAULT_CONTAINERS_PATH: &str = ".spec.template.spec.containers[*]";
/// Default location of a container's name, relative to the container
pub const DEFAULT_CONTAINER_NAME_PATH: &str = ".name";
/// Default location of a container's env list, relative to the container
pub const DEFAULT_ENV_PATH: &str = ".env";
/// Default location of a container's volume mounts, relative to the container
pub const DEFAULT_VOLUME_MOUNTS_PATH: &str = ".volumeMounts";
/// Default location of the pod volumes
pub const DEFAULT_VOLUMES_PATH: &str = ".spec.template.spec.volumes";

/// Spec for a ClusterWorkloadResourceMapping
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "servicebinding.io",
    version = "v1beta1",
    kind = "ClusterWorkloadResourceMapping",
    plural = "clusterworkloadresourcemappings"
)]
#[serde(rename_all = "camelCase")]
pub struct ClusterWorkloadResourceMappingSpec {
    /// Templates in declaration order; at most one may use the `*` version
    #[serde(default)]
    pub versions: Vec<ClusterWorkloadResourceMappingTemplate>,
}

/// Injection paths for one workload version
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterWorkloadResourceMappingTemplate {
    /// Workload version this template applies to, or `*`
    pub version: String,

    /// Path to the annotations map
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub annotations: String,

    /// Container-like structures within the workload
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub containers: Vec<ClusterWorkloadResourceMappingContainer>,

    /// Path to the volumes list
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub volumes: String,
}

/// Paths describing one container-like structure
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterWorkloadResourceMappingContainer {
    /// Path selecting the container(s), may contain `[*]`
    pub path: String,

    /// Path to the container name, relative to `path`
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Path to the env list, relative to `path`
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub env: String,

    /// Path to the volume mounts list, relative to `path`
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub volume_mounts: String,
}

impl ClusterWorkloadResourceMappingSpec {
    /// Mapping used when no ClusterWorkloadResourceMapping exists for a kind
    pub fn wildcard() -> Self {
        Self {
            versions: vec![ClusterWorkloadResourceMappingTemplate {
                version: WILDCARD_VERSION.to_string(),
                ..Default::default()
            }],
        }
    }

    /// Fill every unset path of every template with its default
    pub fn defaulted(mut self) -> Self {
        self.versions = self
            .versions
            .into_iter()
            .map(ClusterWorkloadResourceMappingTemplate::defaulted)
            .collect();
        self
    }

    /// Pick the template for a workload version
    ///
    /// An exact entry wins; the wildcard entry is the fallback of last resort.
    pub fn template_for(&self, version: &str) -> Option<&ClusterWorkloadResourceMappingTemplate> {
        self.versions
            .iter()
            .find(|t| t.version == version)
            .or_else(|| self.versions.iter().find(|t| t.is_wildcard()))
    }

    /// Check for empty, duplicate and multiple wildcard version entries
    pub fn validate(&self, name: &str) -> Result<(), Error> {
        let mut seen = HashSet::new();
        for (i, template) in self.versions.iter().enumerate() {
            let field = format!("spec.versions[{i}].version");
            if template.version.is_empty() {
                return Err(Error::validation_for_field(name, field, "version is required"));
            }
            if !seen.insert(template.version.as_str()) {
                let msg = if template.is_wildcard() {
                    "at most one wildcard version is allowed".to_string()
                } else {
                    format!("duplicate version '{}'", template.version)
                };
                return Err(Error::validation_for_field(name, field, msg));
            }
            for (j, container) in template.containers.iter().enumerate() {
                if container.path.is_empty() {
                    return Err(Error::validation_for_field(
                        name,
                        format!("spec.versions[{i}].containers[{j}].path"),
                        "path is required",
                    ));
                }
            }
        }
        Ok(())
    }
}

impl ClusterWorkloadResourceMappingTemplate {
    /// True when this template matches any version
    pub fn is_wildcard(&self) -> bool {
        self.version == WILDCARD_VERSION
    }

    /// Fill unset paths with their defaults, keeping explicit values
    pub fn defaulted(mut self) -> Self {
        if self.annotations.is_empty() {
            self.annotations = DEFAULT_ANNOTATIONS_PATH.to_string();
        }
        if self.containers.is_empty() {
            self.containers = vec![
                ClusterWorkloadResourceMappingContainer {
                    path: DEFAULT_INIT_CONTAINERS_PATH.to_string(),
                    name: DEFAULT_CONTAINER_NAME_PATH.to_string(),
                    ..Default::default()
                },
                ClusterWorkloadResourceMappingContainer {
                    path: DEFAULT_CONTAINERS_PATH.to_string(),
                    name: DEFAULT_CONTAINER_NAME_PATH.to_string(),
                    ..Default::default()
                },
            ];
        }
        self.containers = self
            .containers
            .into_iter()
            .map(ClusterWorkloadResourceMappingContainer::defaulted)
            .collect();
        if self.volumes.is_empty() {
            self.volumes = DEFAULT_VOLUMES_PATH.to_string();
        }
        self
    }
}

impl ClusterWorkloadResourceMappingContainer {
    /// Fill unset env and volume mount paths; `name` stays optional
    pub fn defaulted(mut self) -> Self {
        if self.env.is_empty() {
            self.env = DEFAULT_ENV_PATH.to_string();
        }
        if self.volume_mounts.is_empty() {
            self.volume_mounts = DEFAULT_VOLUME_MOUNTS_PATH.to_string();
        }
        self
    }
}
