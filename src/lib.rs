//! # Applier Library
//!
//! This library renders a set of templated resource manifests and applies
//! them to a cluster in a safe, deterministic order. It is designed to be used
//! by the `applier` command-line tool but can also be embedded by anything
//! that needs the same render-then-apply pipeline.
//!
//! ## Quick Example
//!
//! ```
//! use applier::assets::AssetName;
//! use applier::manifest;
//! use applier::phases::ordering::{self, KindOrder};
//! use applier::template;
//! use applier::values::ValuesDocument;
//! use std::path::PathBuf;
//!
//! let values = ValuesDocument::parse(b"Name: settings\n").unwrap();
//! let rendered = template::compile(
//!     "kind: ConfigMap\nmetadata:\n  name: {{ .Name }}\n---\nkind: Namespace\nmetadata:\n  name: ns\n",
//!     &values,
//! )
//! .unwrap();
//!
//! let asset = AssetName::new(PathBuf::from("app.yaml"), PathBuf::from("app.yaml"));
//! let manifests = manifest::split(&asset, rendered.as_bytes()).unwrap();
//! let ordered = ordering::execute(manifests, KindOrder::Standard);
//!
//! assert_eq!(ordered[0].to_string(), "Namespace/ns");
//! assert_eq!(ordered[1].to_string(), "ConfigMap/settings");
//! ```
//!
//! ## Core Concepts
//!
//! - **Values (`values`)**: The configuration document that feeds templates,
//!   read from a file or from piped standard input.
//! - **Assets (`assets`)**: Template files selected from file and directory
//!   roots, minus the header and any exclusions.
//! - **Templates (`template`)**: The substitution primitive applied to the
//!   header and each asset.
//! - **Manifests (`manifest`)**: Resource documents split out of rendered
//!   assets.
//! - **Cluster access (`kube`)**: The `KubeOperations` trait and its
//!   `kubectl`-backed implementation.
//! - **Phases (`phases`)**: The pipeline that ties everything together.
//!
//! ## Execution Flow
//!
//! The main entry points live in `phases::orchestrator`:
//!
//! 1.  **Values**: Resolve the values document.
//! 2.  **Discovery**: Select the ordered, deduplicated asset list.
//! 3.  **Rendering**: Render header and asset together, split into manifests.
//! 4.  **Ordering**: Sort manifests by kind.
//! 5.  **Dispatch**: Apply with the strategy for the resource type, or skip
//!     the cluster on a dry run or a render.
//! 6.  **Writing**: Write the captured output.

pub mod assets;
pub mod error;
pub mod kube;
pub mod manifest;
pub mod output;
pub mod phases;
pub mod template;
pub mod values;

#[cfg(test)]
mod ordering_proptest;
