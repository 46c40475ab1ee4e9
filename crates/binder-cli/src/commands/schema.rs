//! `binder schema` - show how a kind maps to its REST resource

use clap::Args;

use binder_resolver::{MappingSource, SchemaMapping};

use super::output::{print, OutputFormat};
use super::KindArgs;
use crate::Result;

/// Show the REST mapping of a kind
#[derive(Args, Debug)]
pub struct SchemaArgs {
    #[command(flatten)]
    pub target: KindArgs,
}

/// Resolve the mapping for the requested kind
pub async fn resolve(args: &SchemaArgs, source: &impl MappingSource) -> Result<SchemaMapping> {
    Ok(source.lookup_schema_mapping(&args.target.gvk()).await?)
}

/// Run the schema command
pub async fn run(args: SchemaArgs, source: &impl MappingSource, output: OutputFormat) -> Result<()> {
    let mapping = resolve(&args, source).await?;
    print(&mapping, output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::MockMappingSource;
    use crate::Error;
    use binder_resolver::{ResolveError, Scope};

    fn args(api_version: &str, kind: &str) -> SchemaArgs {
        SchemaArgs {
            target: KindArgs {
                api_version: api_version.to_string(),
                kind: kind.to_string(),
            },
        }
    }

    #[tokio::test]
    async fn resolves_the_requested_kind() {
        let mut source = MockMappingSource::new();
        source
            .expect_lookup_schema_mapping()
            .withf(|gvk| gvk.group == "apps" && gvk.version == "v1" && gvk.kind == "Deployment")
            .times(1)
            .returning(|gvk| {
                Ok(SchemaMapping {
                    group: gvk.group.clone(),
                    version: gvk.version.clone(),
                    kind: gvk.kind.clone(),
                    plural: "deployments".to_string(),
                    scope: Scope::Namespaced,
                })
            });

        let mapping = resolve(&args("apps/v1", "Deployment"), &source).await.unwrap();
        assert_eq!(mapping.plural, "deployments");
        assert!(mapping.is_namespaced());
    }

    #[tokio::test]
    async fn unknown_kind_is_terminal() {
        let mut source = MockMappingSource::new();
        source.expect_lookup_schema_mapping().returning(|_| {
            Err(ResolveError::SchemaNotFound {
                gvk: "db.example/v1/MyDatabase".to_string(),
                message: "no matches for kind".to_string(),
            })
        });

        let err = resolve(&args("db.example/v1", "MyDatabase"), &source)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Resolve(ResolveError::SchemaNotFound { .. })));
        assert!(!err.is_retryable());
    }
}
