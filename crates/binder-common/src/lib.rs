//! Common types for the service binding resolver: resource types, errors
//! and Kubernetes helpers

#![deny(missing_docs)]

pub mod crd;
pub mod document;
pub mod error;
pub mod kube_utils;
pub mod telemetry;

pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;
