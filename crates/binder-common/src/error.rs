//! Error types shared by the binder crates
//!
//! Errors carry structured fields so callers can decide whether to retry
//! and which resource or field to blame when reporting.

use thiserror::Error;

/// Default context value when no specific context is available
pub const UNKNOWN_CONTEXT: &str = "unknown";

/// Main error type for shared binder operations
#[derive(Debug, Error)]
pub enum Error {
    /// Kubernetes API error
    #[error("kubernetes error: {source}")]
    Kube {
        /// The underlying kube-rs error
        #[from]
        source: kube::Error,
    },

    /// Client configuration (kubeconfig, context, timeouts) could not be loaded
    #[error("client configuration error [{context}]: {message}")]
    ClientConfig {
        /// Description of what failed
        message: String,
        /// Where the failure happened (e.g., "kubeconfig", "infer")
        context: String,
    },

    /// Validation error for a resource or template
    #[error("validation error for {resource}: {message}")]
    Validation {
        /// Name of the resource with invalid content
        resource: String,
        /// Description of what's invalid
        message: String,
        /// The invalid field path (e.g., "spec.versions[1].version")
        field: Option<String>,
    },

    /// Serialization/deserialization error
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of what failed
        message: String,
        /// The resource kind being decoded (if known)
        kind: Option<String>,
    },

    /// Logging subscriber could not be installed
    #[error("telemetry error: {message}")]
    Telemetry {
        /// Description of what failed
        message: String,
    },
}

impl Error {
    /// Create a validation error with the given message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            resource: UNKNOWN_CONTEXT.to_string(),
            message: msg.into(),
            field: None,
        }
    }

    /// Create a validation error with resource context and field path
    pub fn validation_for_field(
        resource: impl Into<String>,
        field: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        Self::Validation {
            resource: resource.into(),
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// Create a client configuration error with context
    pub fn client_config(context: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::ClientConfig {
            message: msg.into(),
            context: context.into(),
        }
    }

    /// Create a serialization error with the given message
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: None,
        }
    }

    /// Create a serialization error with resource kind context
    pub fn serialization_for_kind(kind: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: Some(kind.into()),
        }
    }

    /// Create a telemetry error
    pub fn telemetry(msg: impl Into<String>) -> Self {
        Self::Telemetry {
            message: msg.into(),
        }
    }

    /// Check if this error is retryable
    ///
    /// Validation, serialization and configuration errors need a fix from
    /// the user. Kubernetes errors are retryable unless the API server
    /// rejected the request with a 4xx.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Kube { source } => !matches!(
                source,
                kube::Error::Api(ae) if (400..500).contains(&ae.code)
            ),
            Error::ClientConfig { .. } => false,
            Error::Validation { .. } => false,
            Error::Serialization { .. } => false,
            Error::Telemetry { .. } => false,
        }
    }

    /// Get the field path if this is a field-level validation error
    pub fn field(&self) -> Option<&str> {
        match self {
            Error::Validation { field, .. } => field.as_deref(),
            _ => None,
        }
    }
}
