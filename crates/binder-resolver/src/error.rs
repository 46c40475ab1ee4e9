//! Resolution errors
//!
//! Terminal errors mean the binding is misconfigured for this attempt.
//! Retryable errors mean cluster infrastructure failed transiently; the
//! caller owns backoff.

use thiserror::Error;

use crate::cluster::AccessError;
use crate::selector::SelectorError;

/// Error returned by resolver lookups
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The kind is not registered with the cluster
    #[error("no schema mapping for {gvk}: {message}")]
    SchemaNotFound {
        /// Group/version/kind that was looked up
        gvk: String,
        /// Detail from discovery
        message: String,
    },

    /// Type discovery is unavailable
    #[error("type discovery failed: {message}")]
    Discovery {
        /// Description of what failed
        message: String,
    },

    /// A get or list failed for a reason other than not-found
    #[error("lookup of {kind} {name} failed: {source}")]
    LookupFailed {
        /// Kind being read
        kind: String,
        /// Name being read (empty for lists)
        name: String,
        /// Underlying access error
        #[source]
        source: AccessError,
    },

    /// A workload referenced by name does not exist
    #[error("workload {kind} {namespace}/{name} not found")]
    WorkloadNotFound {
        /// Workload kind
        kind: String,
        /// Workload namespace
        namespace: String,
        /// Workload name
        name: String,
    },

    /// The workload selector is malformed
    #[error("invalid label selector: {source}")]
    InvalidSelector {
        /// Validation failure
        #[from]
        source: SelectorError,
    },

    /// A referenced service does not exist
    #[error("service {kind} {namespace}/{name} not found")]
    ServiceNotFound {
        /// Service kind
        kind: String,
        /// Service namespace
        namespace: String,
        /// Service name
        name: String,
    },

    /// The referenced service does not have the provisioned service shape
    #[error("{kind} {name} is not a provisioned service: {message}")]
    NotAProvisionedService {
        /// Service kind
        kind: String,
        /// Service name
        name: String,
        /// Why the shape did not match
        message: String,
    },

    /// An object carries no apiVersion/kind, so its mapping cannot be found
    #[error("object {name} has no apiVersion/kind")]
    MissingTypeMeta {
        /// Name of the object, if it has one
        name: String,
    },
}

impl ResolveError {
    /// Map a discovery failure
    pub fn from_discovery(err: AccessError, gvk: String) -> Self {
        match err {
            AccessError::UnknownKind { gvk, message } => Self::SchemaNotFound { gvk, message },
            e @ AccessError::NotFound { .. } => Self::SchemaNotFound {
                message: e.to_string(),
                gvk,
            },
            other => Self::Discovery {
                message: other.to_string(),
            },
        }
    }

    /// Wrap an access failure as `LookupFailed`
    pub fn lookup_failed(
        kind: impl Into<String>,
        name: impl Into<String>,
        source: AccessError,
    ) -> Self {
        Self::LookupFailed {
            kind: kind.into(),
            name: name.into(),
            source,
        }
    }

    /// True for transient infrastructure failures worth retrying
    ///
    /// Everything else is terminal for this resolution attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Discovery { .. } | Self::LookupFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_kind_becomes_schema_not_found() {
        let err = ResolveError::from_discovery(
            AccessError::UnknownKind {
                gvk: "db.example/v1/MyDatabase".to_string(),
                message: "Missing Kind".to_string(),
            },
            "db.example/v1/MyDatabase".to_string(),
        );
        assert!(matches!(err, ResolveError::SchemaNotFound { .. }));
        assert!(!err.is_retryable());
    }

    #[test]
    fn discovery_outage_is_retryable() {
        let err = ResolveError::from_discovery(
            AccessError::Discovery {
                message: "connection refused".to_string(),
            },
            "apps/v1/Deployment".to_string(),
        );
        assert!(matches!(err, ResolveError::Discovery { .. }));
        assert!(err.is_retryable());
    }

    #[test]
    fn retryability_by_kind() {
        let lookup = ResolveError::lookup_failed(
            "Deployment",
            "web",
            AccessError::Discovery {
                message: "timeout".to_string(),
            },
        );
        assert!(lookup.is_retryable());

        let terminal = [
            ResolveError::WorkloadNotFound {
                kind: "Deployment".to_string(),
                namespace: "ns".to_string(),
                name: "web".to_string(),
            },
            ResolveError::ServiceNotFound {
                kind: "MyDatabase".to_string(),
                namespace: "ns".to_string(),
                name: "pg".to_string(),
            },
            ResolveError::NotAProvisionedService {
                kind: "MyDatabase".to_string(),
                name: "pg".to_string(),
                message: "bad status".to_string(),
            },
            ResolveError::MissingTypeMeta {
                name: "x".to_string(),
            },
            ResolveError::from(SelectorError::InvalidKey {
                key: "-".to_string(),
                reason: "bad",
            }),
        ];
        for err in terminal {
            assert!(!err.is_retryable(), "{err} should be terminal");
        }
    }

    #[test]
    fn messages_name_the_resource() {
        let err = ResolveError::WorkloadNotFound {
            kind: "Deployment".to_string(),
            namespace: "ns".to_string(),
            name: "web".to_string(),
        };
        assert_eq!(err.to_string(), "workload Deployment ns/web not found");
    }
}
