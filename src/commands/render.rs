//! Render command implementation
//!
//! `applier render` runs the pipeline up to ordering and stops before the
//! cluster. The ordered manifests are written to `--output-file` or standard
//! output. With `--output-dir`, each rendered template is written to the
//! directory instead, at its path relative to the root it was found under.

use anyhow::Result;
use clap::Args;
use std::io;
use std::path::PathBuf;

use applier::output::{status_line, OutputConfig, Status};
use applier::phases::orchestrator::{self, RenderRequest};
use applier::values::StdinInput;

use super::SourceArgs;

/// Arguments for the render command
#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    #[command(flatten)]
    pub sources: SourceArgs,

    /// Write the ordered manifests to this file instead of standard output
    #[arg(short, long, value_name = "FILE")]
    pub output_file: Option<PathBuf>,

    /// Write each rendered template under this directory
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Order manifests by kind
    #[arg(
        long,
        value_name = "BOOL",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    pub sort_on_kind: bool,
}

impl RenderArgs {
    fn into_request(self) -> RenderRequest {
        let mut request = RenderRequest::new(self.sources.into_sources());
        request.sort_on_kind = self.sort_on_kind;
        request.output_file = self.output_file;
        request.output_dir = self.output_dir;
        request
    }
}

/// Execute the render command
pub fn execute(args: RenderArgs, output: &OutputConfig) -> Result<()> {
    let request = args.into_request();

    match orchestrator::execute_render(&request, &mut StdinInput, &mut io::stdout().lock()) {
        Ok(batch) => {
            eprintln!(
                "{}",
                status_line(
                    output,
                    Status::Success,
                    &format!("Rendered {} manifest(s)", batch.len()),
                )
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", status_line(output, Status::Failure, "Render failed"));
            Err(e.into())
        }
    }
}
