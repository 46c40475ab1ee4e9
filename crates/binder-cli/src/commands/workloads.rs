//! `binder workloads` - list the workloads a binding would target

use clap::Args;
use kube::api::DynamicObject;
use kube::ResourceExt;
use serde::Serialize;
use tracing::warn;

use binder_resolver::Resolver;

use super::output::{print, OutputFormat};
use super::KindArgs;
use crate::selector::parse_selector;
use crate::Result;

/// List the workloads a binding would target
#[derive(Args, Debug)]
pub struct WorkloadsArgs {
    #[command(flatten)]
    pub target: KindArgs,

    /// Namespace (default: the kubeconfig context's namespace)
    #[arg(short, long, default_value = "")]
    pub namespace: String,

    /// Workload name; takes precedence over --selector
    #[arg(long)]
    pub name: Option<String>,

    /// Label selector query, e.g. `app=web,tier in (frontend)`
    #[arg(short = 'l', long)]
    pub selector: Option<String>,
}

/// One matched workload
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WorkloadSummary {
    /// Namespace, absent for cluster-scoped kinds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Object name
    pub name: String,
}

impl From<&DynamicObject> for WorkloadSummary {
    fn from(obj: &DynamicObject) -> Self {
        Self {
            namespace: obj.namespace(),
            name: obj.name_any(),
        }
    }
}

/// Resolve the workloads matching the flags, in listing order
pub async fn resolve(args: &WorkloadsArgs, resolver: &impl Resolver) -> Result<Vec<WorkloadSummary>> {
    let name = args.name.as_deref().unwrap_or_default();
    let workload_ref = args.target.reference(&args.namespace, name);
    let selector = args.selector.as_deref().map(parse_selector).transpose()?;
    if name.is_empty() && selector.is_none() {
        warn!(kind = %args.target.kind, "neither --name nor --selector given, nothing matches");
    }

    let workloads = resolver
        .lookup_workloads(&workload_ref, selector.as_ref())
        .await?;
    Ok(workloads.iter().map(WorkloadSummary::from).collect())
}

/// Run the workloads command
pub async fn run(args: WorkloadsArgs, resolver: &impl Resolver, output: OutputFormat) -> Result<()> {
    let workloads = resolve(&args, resolver).await?;
    print(&workloads, output)
}
