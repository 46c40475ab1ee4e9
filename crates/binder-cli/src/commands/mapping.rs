//! `binder mapping` - show where bindings inject into a workload resource

use clap::Args;
use kube::core::GroupVersionResource;
use tracing::warn;

use binder_common::crd::ClusterWorkloadResourceMapping;
use binder_common::kube_utils::parse_api_version;
use binder_resolver::{workload_mapping_name, MappingSource};

use super::output::{print, OutputFormat};
use crate::Result;

/// Show the defaulted injection template of a workload resource
#[derive(Args, Debug)]
pub struct MappingArgs {
    /// API version of the workload, e.g. batch/v1
    #[arg(long)]
    pub api_version: String,

    /// Plural resource name, e.g. cronjobs
    #[arg(long)]
    pub resource: String,
}

impl MappingArgs {
    fn gvr(&self) -> GroupVersionResource {
        let (group, version) = parse_api_version(&self.api_version);
        GroupVersionResource::gvr(&group, &version, &self.resource)
    }
}

/// Resolved template, plus the validation problem if it has one
#[derive(Debug)]
pub struct MappingReport {
    /// The mapping as it would be applied, named after its resource
    pub mapping: ClusterWorkloadResourceMapping,
    /// Validation failure, if any
    pub problem: Option<String>,
}

/// Resolve and validate the mapping for the requested resource
pub async fn resolve(args: &MappingArgs, source: &impl MappingSource) -> Result<MappingReport> {
    let gvr = args.gvr();
    let name = workload_mapping_name(&gvr);
    let spec = source.lookup_workload_mapping(&gvr).await?;
    let problem = spec.validate(&name).err().map(|e| e.to_string());
    Ok(MappingReport {
        mapping: ClusterWorkloadResourceMapping::new(&name, spec),
        problem,
    })
}

/// Run the mapping command
pub async fn run(args: MappingArgs, source: &impl MappingSource, output: OutputFormat) -> Result<()> {
    let report = resolve(&args, source).await?;
    if let Some(problem) = &report.problem {
        warn!(resource = %args.resource, %problem, "workload mapping is invalid");
        eprintln!("warning: {problem}");
    }
    print(&report.mapping, output)
}
