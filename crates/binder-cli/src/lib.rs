//! Binder CLI library

pub mod commands;
pub mod config;
pub mod error;
pub mod selector;

pub use error::{Error, Result};

use clap::{Parser, Subcommand};

use binder_common::kube_utils::create_client;
use binder_common::telemetry::LogFormat;
use binder_resolver::ClusterResolver;

use crate::commands::output::OutputFormat;
use crate::config::ClientArgs;

/// Binder - resolve service binding references against a cluster
#[derive(Parser, Debug)]
#[command(name = "binder")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub client: ClientArgs,

    /// Log format (text or json)
    #[arg(long, env = "BINDER_LOG_FORMAT", default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Output format
    #[arg(short, long, value_enum, default_value = "yaml", global = true)]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the REST mapping of a kind
    Schema(commands::schema::SchemaArgs),
    /// Show the defaulted injection template of a workload resource
    Mapping(commands::mapping::MappingArgs),
    /// List the workloads a binding would target
    Workloads(commands::workloads::WorkloadsArgs),
    /// Show the binding Secret name exposed by a service
    Secret(commands::secret::SecretArgs),
}

impl Cli {
    /// Run the CLI command
    pub async fn run(self) -> Result<()> {
        let client = create_client(&self.client.to_client_config()).await?;
        let resolver = ClusterResolver::from_client(client);
        let output = self.output;

        match self.command {
            Commands::Schema(args) => commands::schema::run(args, &resolver, output).await,
            Commands::Mapping(args) => commands::mapping::run(args, &resolver, output).await,
            Commands::Workloads(args) => commands::workloads::run(args, &resolver, output).await,
            Commands::Secret(args) => commands::secret::run(args, &resolver, output).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "binder",
            "schema",
            "--api-version",
            "apps/v1",
            "--kind",
            "Deployment",
            "-o",
            "json",
            "--log-format",
            "json",
            "--context",
            "kind-dev",
        ])
        .unwrap();
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.log_format, LogFormat::Json);
        assert_eq!(cli.client.context.as_deref(), Some("kind-dev"));
        assert!(matches!(cli.command, Commands::Schema(_)));
    }

    #[test]
    fn defaults_to_yaml_and_text() {
        let cli = Cli::try_parse_from([
            "binder",
            "secret",
            "--api-version",
            "v1",
            "--kind",
            "Secret",
            "--name",
            "creds",
        ])
        .unwrap();
        assert_eq!(cli.output, OutputFormat::Yaml);
        assert_eq!(cli.log_format, LogFormat::Text);
    }

    #[test]
    fn rejects_unknown_log_format() {
        let result = Cli::try_parse_from([
            "binder",
            "--log-format",
            "xml",
            "schema",
            "--api-version",
            "v1",
            "--kind",
            "Pod",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["binder"]).is_err());
    }
}
