//! Apply command implementation
//!
//! `applier apply <resource-type>` runs the full pipeline:
//! 1. Resolving values from `--values` or piped standard input
//! 2. Selecting templates from `--path`, minus the header and exclusions
//! 3. Rendering every template with the header and values
//! 4. Ordering manifests by kind
//! 5. Applying them with the strategy of the chosen resource type
//! 6. Writing the captured manifests to `--output-file` or standard output
//!
//! With `--dry-run` steps 1-4 and 6 run unchanged but nothing reaches the
//! cluster.

use anyhow::Result;
use clap::{Args, Subcommand};
use std::io;
use std::path::PathBuf;

use applier::kube::{Kubectl, ResourceType};
use applier::output::{status_line, OutputConfig, Status};
use applier::phases::orchestrator::{self, ApplyRequest};
use applier::values::StdinInput;

use super::SourceArgs;

/// Arguments for the apply command
#[derive(Args, Debug)]
pub struct ApplyArgs {
    #[command(subcommand)]
    pub resources: ApplyCommand,
}

/// Resource type to apply
#[derive(Subcommand, Debug)]
pub enum ApplyCommand {
    /// Create or update core resources, ordered by kind
    CoreResources(CoreResourcesArgs),

    /// Apply Deployments and wait for their rollout
    Deployments(ResourceArgs),

    /// Apply custom resources with server-side apply
    CustomResources(ResourceArgs),
}

/// Arguments shared by every resource type
#[derive(Args, Debug, Clone)]
pub struct ResourceArgs {
    #[command(flatten)]
    pub sources: SourceArgs,

    /// Render and validate without changing the cluster
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Write the applied manifests to this file instead of standard output
    #[arg(short, long, value_name = "FILE")]
    pub output_file: Option<PathBuf>,

    #[command(flatten)]
    pub kube: KubeArgs,
}

/// Arguments for `apply core-resources`
#[derive(Args, Debug, Clone)]
pub struct CoreResourcesArgs {
    #[command(flatten)]
    pub common: ResourceArgs,

    /// Order manifests by kind before applying
    #[arg(
        long,
        value_name = "BOOL",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    pub sort_on_kind: bool,
}

/// How to reach the cluster
#[derive(Args, Debug, Clone)]
pub struct KubeArgs {
    /// Kubeconfig file
    #[arg(long, value_name = "FILE", env = "KUBECONFIG")]
    pub kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to use
    #[arg(long, value_name = "NAME")]
    pub context: Option<String>,

    /// Deadline for each request to the API server, e.g. 30s
    #[arg(long, value_name = "DURATION")]
    pub request_timeout: Option<String>,

    /// How long to wait for a Deployment rollout
    #[arg(long, value_name = "DURATION", default_value = "5m")]
    pub rollout_timeout: String,

    /// kubectl binary to run
    #[arg(long, value_name = "PATH", env = "APPLIER_KUBECTL", default_value = "kubectl")]
    pub kubectl: PathBuf,
}

impl KubeArgs {
    fn client(&self) -> Kubectl {
        Kubectl::new()
            .with_binary(self.kubectl.clone())
            .with_kubeconfig(self.kubeconfig.clone())
            .with_context(self.context.clone())
            .with_request_timeout(self.request_timeout.clone())
            .with_rollout_timeout(self.rollout_timeout.clone())
    }
}

impl ApplyCommand {
    fn into_request(self) -> (ApplyRequest, KubeArgs) {
        let (common, resource_type, sort_on_kind) = match self {
            ApplyCommand::CoreResources(args) => {
                (args.common, ResourceType::CoreResources, args.sort_on_kind)
            }
            ApplyCommand::Deployments(args) => (args, ResourceType::Deployments, true),
            ApplyCommand::CustomResources(args) => (args, ResourceType::CustomResources, true),
        };

        let mut request = ApplyRequest::new(common.sources.into_sources(), resource_type);
        request.dry_run = common.dry_run;
        request.sort_on_kind = sort_on_kind;
        request.output_file = common.output_file;
        (request, common.kube)
    }
}

/// Execute the apply command
pub fn execute(args: ApplyArgs, output: &OutputConfig) -> Result<()> {
    let (request, kube) = args.resources.into_request();
    let client = kube.client();

    let result = orchestrator::execute_apply(
        &request,
        &client,
        &mut StdinInput,
        &mut io::stdout().lock(),
    );

    match result {
        Ok(outcomes) => {
            let (status, verb) = if request.dry_run {
                (Status::DryRun, "Validated")
            } else {
                (Status::Success, "Applied")
            };
            eprintln!(
                "{}",
                status_line(
                    output,
                    status,
                    &format!(
                        "{} {} manifest(s) as {}",
                        verb,
                        outcomes.len(),
                        request.resource_type.as_str()
                    ),
                )
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", status_line(output, Status::Failure, "Apply failed"));
            Err(e.into())
        }
    }
}
