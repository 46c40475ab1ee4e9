//! Cluster connection flags

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;

use binder_common::kube_utils::ClientConfig;

/// How to reach the cluster
#[derive(Args, Debug, Clone)]
pub struct ClientArgs {
    /// Path to kubeconfig file (default: in-cluster or ~/.kube/config)
    #[arg(long, env = "KUBECONFIG", global = true)]
    pub kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to use instead of the current one
    #[arg(long, global = true)]
    pub context: Option<String>,

    /// TCP connect timeout in seconds
    #[arg(long, env = "BINDER_CONNECT_TIMEOUT", default_value_t = 5, global = true)]
    pub connect_timeout: u64,

    /// Per-request read timeout in seconds
    #[arg(long, env = "BINDER_READ_TIMEOUT", default_value_t = 30, global = true)]
    pub read_timeout: u64,
}

impl ClientArgs {
    /// Convert the flags into a client configuration
    pub fn to_client_config(&self) -> ClientConfig {
        ClientConfig {
            kubeconfig: self.kubeconfig.clone(),
            context: self.context.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout),
            read_timeout: Duration::from_secs(self.read_timeout),
        }
    }
}
