//! Kubernetes client helpers using kube-rs

use std::path::PathBuf;
use std::time::Duration;

use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use tracing::debug;

use crate::Error;

/// Default connection timeout for kube clients
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default read timeout for kube clients
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// How to build a Kubernetes client
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Explicit kubeconfig file; `None` infers (in-cluster or `$KUBECONFIG`)
    pub kubeconfig: Option<PathBuf>,
    /// Kubeconfig context to use instead of the current one
    pub context: Option<String>,
    /// TCP connect timeout
    pub connect_timeout: Duration,
    /// Per-request read timeout
    pub read_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            kubeconfig: None,
            context: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

impl ClientConfig {
    fn kubeconfig_options(&self) -> KubeConfigOptions {
        KubeConfigOptions {
            context: self.context.clone(),
            ..Default::default()
        }
    }
}

/// Create a kube client from a [`ClientConfig`]
pub async fn create_client(config: &ClientConfig) -> Result<Client, Error> {
    let mut kube_config = match (&config.kubeconfig, &config.context) {
        (Some(path), _) => {
            let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
                Error::client_config(
                    "kubeconfig",
                    format!("failed to read {}: {}", path.display(), e),
                )
            })?;
            Config::from_custom_kubeconfig(kubeconfig, &config.kubeconfig_options())
                .await
                .map_err(|e| {
                    Error::client_config("kubeconfig", format!("failed to load kubeconfig: {e}"))
                })?
        }
        (None, Some(_)) => Config::from_kubeconfig(&config.kubeconfig_options())
            .await
            .map_err(|e| {
                Error::client_config("kubeconfig", format!("failed to load kubeconfig: {e}"))
            })?,
        (None, None) => Config::infer()
            .await
            .map_err(|e| Error::client_config("infer", format!("failed to infer config: {e}")))?,
    };
    kube_config.connect_timeout = Some(config.connect_timeout);
    kube_config.read_timeout = Some(config.read_timeout);

    debug!(
        cluster_url = %kube_config.cluster_url,
        namespace = %kube_config.default_namespace,
        "creating kube client"
    );
    Client::try_from(kube_config).map_err(Error::from)
}

/// Split an apiVersion into (group, version)
///
/// Core resources use a bare version ("v1") and get an empty group.
pub fn parse_api_version(api_version: &str) -> (String, String) {
    match api_version.split_once('/') {
        Some((group, version)) => (group.to_string(), version.to_string()),
        None => (String::new(), api_version.to_string()),
    }
}

/// Join a group and version into an apiVersion
pub fn format_api_version(group: &str, version: &str) -> String {
    if group.is_empty() {
        version.to_string()
    } else {
        format!("{group}/{version}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_grouped_and_core_versions() {
        assert_eq!(
            parse_api_version("apps/v1"),
            ("apps".to_string(), "v1".to_string())
        );
        assert_eq!(parse_api_version("v1"), (String::new(), "v1".to_string()));
        assert_eq!(
            parse_api_version("servicebinding.io/v1beta1"),
            ("servicebinding.io".to_string(), "v1beta1".to_string())
        );
    }

    #[test]
    fn format_is_inverse_of_parse() {
        for api_version in ["apps/v1", "v1", "db.example/v1alpha1"] {
            let (group, version) = parse_api_version(api_version);
            assert_eq!(format_api_version(&group, &version), api_version);
        }
    }

    #[test]
    fn default_client_config_uses_default_timeouts() {
        let config = ClientConfig::default();
        assert!(config.kubeconfig.is_none());
        assert_eq!(config.connect_timeout, DEFAULT_CONNECT_TIMEOUT);
        assert_eq!(config.read_timeout, DEFAULT_READ_TIMEOUT);
    }

    #[test]
    fn context_flows_into_kubeconfig_options() {
        let config = ClientConfig {
            context: Some("kind-dev".to_string()),
            ..Default::default()
        };
        assert_eq!(config.kubeconfig_options().context.as_deref(), Some("kind-dev"));
    }
}
