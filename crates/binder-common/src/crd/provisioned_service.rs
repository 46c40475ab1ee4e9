//! ProvisionedService duck type
//!
//! Any resource that exposes `status.binding.name` is a provisioned service:
//! the name points at the Secret holding the service's binding values. The
//! concrete kind is irrelevant, so this type is decoded from a
//! `DynamicObject` rather than fetched through a typed API.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::DynamicObject;
use serde::{Deserialize, Serialize};

use crate::document::lookup;
use crate::Error;

/// The minimal shape read from a provisioned service
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct ProvisionedService {
    /// Standard object metadata
    #[serde(default)]
    pub metadata: ObjectMeta,
    /// Status exposing the binding secret
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProvisionedServiceStatus>,
}

/// Observed state of a provisioned service
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ProvisionedServiceStatus {
    /// Secret exposed for binding
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding: Option<BindingSecretReference>,
}

/// Reference to a Secret in the service's namespace
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct BindingSecretReference {
    /// Name of the Secret
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ProvisionedService {
    /// Decode the duck type from an arbitrary object
    ///
    /// Fails when `status`, `status.binding` or `status.binding.name` is
    /// present with the wrong shape. Absent fields decode as unset.
    pub fn from_dynamic(obj: &DynamicObject) -> Result<Self, Error> {
        let status = match lookup(&obj.data, &["status"]) {
            None => None,
            Some(value) => serde_json::from_value(value.clone()).map_err(|e| {
                Error::serialization_for_kind(
                    obj.types.as_ref().map(|t| t.kind.as_str()).unwrap_or("unknown"),
                    format!("status does not match the provisioned service shape: {e}"),
                )
            })?,
        };
        Ok(Self {
            metadata: obj.metadata.clone(),
            status,
        })
    }

    /// Name of the binding Secret, empty while the service is not ready
    pub fn binding_secret_name(&self) -> &str {
        self.status
            .as_ref()
            .and_then(|s| s.binding.as_ref())
            .and_then(|b| b.name.as_deref())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(body: serde_json::Value) -> DynamicObject {
        let mut value = json!({
            "apiVersion": "db.example/v1",
            "kind": "MyDatabase",
            "metadata": {"name": "pg", "namespace": "ns"}
        });
        if let (Some(target), Some(extra)) = (value.as_object_mut(), body.as_object()) {
            target.extend(extra.clone());
        }
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn reads_binding_secret_name() {
        let obj = object(json!({"status": {"binding": {"name": "pg-creds"}}}));
        let svc = ProvisionedService::from_dynamic(&obj).unwrap();
        assert_eq!(svc.binding_secret_name(), "pg-creds");
        assert_eq!(svc.metadata.name.as_deref(), Some("pg"));
    }

    #[test]
    fn unset_binding_is_empty_not_error() {
        for body in [
            json!({}),
            json!({"status": null}),
            json!({"status": {}}),
            json!({"status": {"binding": {}}}),
            json!({"status": {"binding": null}}),
        ] {
            let svc = ProvisionedService::from_dynamic(&object(body.clone())).unwrap();
            assert_eq!(svc.binding_secret_name(), "", "body: {body}");
        }
    }

    #[test]
    fn ignores_unrelated_status_fields() {
        let obj = object(json!({
            "status": {"phase": "Ready", "binding": {"name": "creds"}, "conditions": []}
        }));
        let svc = ProvisionedService::from_dynamic(&obj).unwrap();
        assert_eq!(svc.binding_secret_name(), "creds");
    }

    #[test]
    fn wrong_shape_is_rejected() {
        let obj = object(json!({"status": {"binding": "creds"}}));
        let err = ProvisionedService::from_dynamic(&obj).unwrap_err();
        assert!(err.to_string().contains("provisioned service shape"));

        let obj = object(json!({"status": {"binding": {"name": 7}}}));
        assert!(ProvisionedService::from_dynamic(&obj).is_err());
    }
}
