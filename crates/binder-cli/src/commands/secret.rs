//! `binder secret` - show the binding Secret a service exposes

use clap::Args;
use serde::Serialize;

use binder_resolver::Resolver;

use super::output::{print, OutputFormat};
use super::KindArgs;
use crate::Result;

/// Show the binding Secret name exposed by a service
#[derive(Args, Debug)]
pub struct SecretArgs {
    #[command(flatten)]
    pub target: KindArgs,

    /// Namespace (default: the kubeconfig context's namespace)
    #[arg(short, long, default_value = "")]
    pub namespace: String,

    /// Service name
    #[arg(long)]
    pub name: String,
}

/// Secret resolved for a service
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SecretReport {
    /// The service reference that was resolved
    pub service: String,
    /// Secret name, absent while the service is not ready
    pub secret: Option<String>,
}

impl SecretReport {
    fn new(service: String, secret: String) -> Self {
        Self {
            service,
            secret: (!secret.is_empty()).then_some(secret),
        }
    }
}

/// Resolve the binding Secret for the service named by the flags
pub async fn resolve(args: &SecretArgs, resolver: &impl Resolver) -> Result<SecretReport> {
    let service_ref = args.target.reference(&args.namespace, &args.name);
    let secret = resolver.lookup_binding_secret(&service_ref).await?;
    Ok(SecretReport::new(service_ref.to_string(), secret))
}

/// Run the secret command
pub async fn run(args: SecretArgs, resolver: &impl Resolver, output: OutputFormat) -> Result<()> {
    let report = resolve(&args, resolver).await?;
    if report.secret.is_none() {
        eprintln!(
            "notice: {} has not published a binding secret yet",
            report.service
        );
    }
    print(&report, output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(flatten)]
        secret: SecretArgs,
    }

    #[test]
    fn name_is_required() {
        let result = TestCli::try_parse_from([
            "test",
            "--api-version",
            "db.example/v1",
            "--kind",
            "MyDatabase",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn unpublished_secret_reports_none() {
        let report = SecretReport::new("db.example/v1/MyDatabase ns/pg".to_string(), String::new());
        assert_eq!(report.secret, None);

        let rendered = crate::commands::output::render(&report, OutputFormat::Yaml).unwrap();
        assert!(rendered.contains("secret: null"));
    }

    #[test]
    fn published_secret_is_reported() {
        let report = SecretReport::new("v1/Secret ns/creds".to_string(), "creds".to_string());
        assert_eq!(report.secret.as_deref(), Some("creds"));
    }
}
