//! Path access into loosely-typed resource documents
//!
//! Workloads and provisioned services are read as `DynamicObject`s whose
//! schema is unknown at compile time. These helpers walk a field path
//! through the document body.

use std::collections::BTreeMap;

use kube::api::DynamicObject;
use serde_json::Value;

/// Follow `path` through nested objects, returning the value at the end
///
/// Returns `None` as soon as a segment is missing or the current value is
/// not an object.
pub fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(value, |current, segment| current.as_object()?.get(*segment))
}

/// Like [`lookup`], but only for string leaves
pub fn lookup_str<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    lookup(value, path).and_then(Value::as_str)
}

/// Labels of a dynamic object, empty when unset
pub fn labels(obj: &DynamicObject) -> BTreeMap<String, String> {
    obj.metadata.labels.clone().unwrap_or_default()
}
