//! Orchestrator for complete `applier` runs
//!
//! This module coordinates all phases to provide a clean API for the two
//! end-to-end operations:
//!
//! - [`execute_apply`]: resolve values, discover, render, order, dispatch
//!   through the cluster collaborator, then write the captured output.
//! - [`execute_render`]: the same pipeline without the cluster, writing either
//!   the ordered manifests or the rendered files.
//!
//! Every fatal error stops the run at the stage that raised it. Output is only
//! written once the whole batch has succeeded.

use std::io::Write;
use std::path::PathBuf;

use log::info;

use super::{phase1, phase2, phase3, phase4, phase5, ApplyOutcome, OrderedBatch, Sources};
use crate::error::Result;
use crate::kube::{KubeOperations, ResourceType};
use crate::values::{self, ValuesInput};

/// Everything an apply run needs, as given on the command line.
#[derive(Debug, Clone)]
pub struct ApplyRequest {
    pub sources: Sources,
    pub resource_type: ResourceType,
    pub dry_run: bool,
    /// Only honoured for core resources
    pub sort_on_kind: bool,
    /// Standard output is used when absent
    pub output_file: Option<PathBuf>,
}

impl ApplyRequest {
    pub fn new(sources: Sources, resource_type: ResourceType) -> Self {
        Self {
            sources,
            resource_type,
            dry_run: false,
            sort_on_kind: true,
            output_file: None,
        }
    }
}

/// Everything a render run needs.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub sources: Sources,
    pub sort_on_kind: bool,
    pub output_file: Option<PathBuf>,
    /// Write each rendered asset under this directory instead of streaming
    /// manifests to the output sink
    pub output_dir: Option<PathBuf>,
}

impl RenderRequest {
    pub fn new(sources: Sources) -> Self {
        Self {
            sources,
            sort_on_kind: true,
            output_file: None,
            output_dir: None,
        }
    }
}

/// Build the ordered batch shared by both operations (Phases 1-3).
fn prepare(
    sources: &Sources,
    input: &mut dyn ValuesInput,
    order: phase3::KindOrder,
) -> Result<(Vec<super::RenderedDocument>, OrderedBatch)> {
    let values = values::resolve(sources.values.as_deref(), input)?;

    // Phase 1: Asset Discovery
    let selection = phase1::execute(sources)?;

    // Phase 2: Rendering and Manifest Extraction
    let documents = phase2::execute(&selection, &values)?;
    let manifests = phase2::extract(&documents)?;

    // Phase 3: Kind Ordering
    let batch = OrderedBatch::new(phase3::execute(manifests, order));

    Ok((documents, batch))
}

/// Execute a complete apply run (Phases 1-5).
///
/// Values come from `request.sources.values` or, when absent, from `input`
/// if it is piped. Captured output goes to `request.output_file` or, when
/// absent, to `stdout`. Returns the per-manifest outcomes in apply order.
pub fn execute_apply(
    request: &ApplyRequest,
    client: &dyn KubeOperations,
    input: &mut dyn ValuesInput,
    stdout: &mut dyn Write,
) -> Result<Vec<ApplyOutcome>> {
    let order = phase4::kind_order_for(request.resource_type, request.sort_on_kind);
    let (_, batch) = prepare(&request.sources, input, order)?;

    // Phase 4: Dispatch
    let outcomes = phase4::Applier::new(client, request.resource_type)
        .with_dry_run(request.dry_run)
        .apply(&batch)?;
    info!(
        "Applied {} manifest(s) as {}{}",
        outcomes.len(),
        request.resource_type.as_str(),
        if request.dry_run { " (dry run)" } else { "" }
    );

    // Phase 5: Writing Output
    let blocks: Vec<String> = outcomes.iter().map(|o| o.output.clone()).collect();
    phase5::execute(request.output_file.as_deref(), &blocks, stdout)?;

    Ok(outcomes)
}

/// Execute a complete render run: Phases 1-3 and 5, never touching a cluster.
///
/// Returns the ordered batch that was rendered.
pub fn execute_render(
    request: &RenderRequest,
    input: &mut dyn ValuesInput,
    stdout: &mut dyn Write,
) -> Result<OrderedBatch> {
    let order = phase3::KindOrder::from_sort_on_kind(request.sort_on_kind);
    let (documents, batch) = prepare(&request.sources, input, order)?;

    if let Some(output_dir) = &request.output_dir {
        phase5::write_rendered(&documents, output_dir)?;
    }

    if request.output_file.is_some() || request.output_dir.is_none() {
        phase5::execute(request.output_file.as_deref(), &batch.output_blocks(), stdout)?;
    }

    Ok(batch)
}
