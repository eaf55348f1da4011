//! Implementation of the phases of an `applier` run.
//!
//! ## Overview
//!
//! A run is a sequential pipeline. Each phase fully owns its working data and
//! hands an immutable result to the next:
//! 1. Discovery - Select the ordered, deduplicated list of assets
//! 2. Rendering - Merge header and values into each asset, split manifests
//! 3. Ordering - Sort manifests by kind for safe creation order
//! 4. Dispatch - Apply the batch with the strategy for the resource type
//! 5. Writing - Write the captured output (or rendered files) to their sink
//!
//! The values document is resolved before Phase 1 and shared read-only by
//! Phase 2. Every template is rendered before any manifest is applied, so a
//! templating failure never leaves the cluster partially updated.

use std::path::PathBuf;

use crate::assets::AssetName;
use crate::manifest::Manifest;

pub mod discovery;
pub mod dispatch;
pub mod ordering;
pub mod orchestrator;
pub mod rendering;
pub mod write;

pub use discovery as phase1;
pub use dispatch as phase4;
pub use ordering as phase3;
pub use rendering as phase2;
pub use write as phase5;

/// Where a run reads its inputs from.
#[derive(Debug, Clone, Default)]
pub struct Sources {
    /// Template roots: files or directories
    pub paths: Vec<PathBuf>,
    /// Fragment prepended to every asset; never rendered on its own
    pub header: Option<PathBuf>,
    /// Paths, directories, or glob patterns to leave out
    pub exclude: Vec<String>,
    /// Values file; standard input is used when absent
    pub values: Option<PathBuf>,
}

/// The result of rendering one asset.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDocument {
    pub asset: AssetName,
    pub content: Vec<u8>,
}

/// Manifests from every rendered document, in apply order.
#[derive(Debug, Clone, Default)]
pub struct OrderedBatch {
    pub manifests: Vec<Manifest>,
}

impl OrderedBatch {
    pub fn new(manifests: Vec<Manifest>) -> Self {
        Self { manifests }
    }

    pub fn len(&self) -> usize {
        self.manifests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.manifests.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Manifest> {
        self.manifests.iter()
    }

    /// The captured output block of every manifest, in order.
    pub fn output_blocks(&self) -> Vec<String> {
        self.manifests.iter().map(Manifest::output_block).collect()
    }
}

/// What happened to one manifest in a successful dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplyOutcome {
    /// `Kind/name` of the manifest
    pub manifest: String,
    /// The asset the manifest was rendered from
    pub asset: String,
    /// Status reported by the cluster; `None` on a dry run
    pub status: Option<String>,
    /// The captured output block
    pub output: String,
}
