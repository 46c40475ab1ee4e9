//! Error types for the CLI

use binder_resolver::ResolveError;

/// CLI Result type
pub type Result<T> = std::result::Result<T, Error>;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Common(#[from] binder_common::Error),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("validation error: {message}")]
    Validation { message: String },
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation {
            message: message.into(),
        }
    }

    /// True when the failure came from transient cluster infrastructure
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Common(e) => e.is_retryable(),
            Error::Resolve(e) => e.is_retryable(),
            _ => false,
        }
    }
}
