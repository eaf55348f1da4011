//! # Error Handling
//!
//! This module defines the centralized error type for the `applier` library.
//! It uses `thiserror` to build a single `Error` enum that covers every
//! failure a run can hit, from reading the values document to writing the
//! captured output.
//!
//! ## Taxonomy
//!
//! The variants fall into four families, each fatal to the run:
//!
//! - **Input errors**: missing values file, invalid root path, empty
//!   selection, unreadable asset. Reported before any cluster call.
//! - **Templating errors**: unresolved reference or malformed template
//!   syntax, reported with the asset that failed. Rendering happens for the
//!   whole batch before any apply, so these never leave a partial apply.
//! - **Apply errors**: the cluster collaborator rejected a manifest. The
//!   batch stops at the first failure; manifests applied before it stay
//!   applied.
//! - **Output errors**: the captured output could not be written.
//!
//! `Result<T>` is the alias used across the crate.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for applier operations
#[derive(Error, Debug)]
pub enum Error {
    /// The values file given with `--values` is missing or unreadable.
    #[error("Values file not found: {}: {message}", path.display())]
    ValuesNotFound { path: PathBuf, message: String },

    /// The values document is not a valid YAML/JSON mapping.
    #[error("Values parsing error: {message}")]
    ValuesParse { message: String },

    /// A `--path` root does not exist or cannot be inspected.
    #[error("Invalid path: {}: {message}", path.display())]
    InvalidRoot { path: PathBuf, message: String },

    /// Discovery and exclusion left nothing to render.
    #[error("No files selected")]
    NoFilesSelected,

    /// An asset listed during discovery could no longer be read.
    #[error("Asset not found: {}: {message}", path.display())]
    AssetNotFound { path: PathBuf, message: String },

    /// Template substitution failed for an asset.
    ///
    /// `variable` carries the unresolved reference when the failure is a
    /// missing key.
    #[error("Template error in {asset}: {message}{}", variable.as_ref().map(|v| format!(" (reference: {})", v)).unwrap_or_default())]
    Template {
        asset: String,
        message: String,
        variable: Option<String>,
    },

    /// A rendered document is not a usable manifest stream.
    #[error("Invalid manifest in {asset}: {message}")]
    Manifest { asset: String, message: String },

    /// The cluster collaborator failed to apply a manifest.
    #[error("Failed to apply {kind}/{name} from {asset}: {message}")]
    Apply {
        kind: String,
        name: String,
        asset: String,
        message: String,
    },

    /// A `kubectl` invocation could not be started or exited non-zero.
    #[error("kubectl {command} failed: {stderr}")]
    Kubectl { command: String, stderr: String },

    /// The captured output could not be written.
    #[error("Failed to write output to {destination}: {message}")]
    Output {
        destination: String,
        message: String,
    },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML error, wrapped from `serde_yaml::Error`.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),

    /// A directory traversal error, wrapped from `walkdir::Error`.
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

impl Error {
    /// Whether this error belongs to the input family, raised before any
    /// rendering or cluster call takes place.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Error::ValuesNotFound { .. }
                | Error::ValuesParse { .. }
                | Error::InvalidRoot { .. }
                | Error::NoFilesSelected
                | Error::AssetNotFound { .. }
        )
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
