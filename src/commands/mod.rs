//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the `applier`
//! command-line tool. Each subcommand is defined in its own file.
//!
//! ## Structure
//!
//! Each command module contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and calls into the
//!   `applier` library to run the pipeline.
//!
//! Flags that select templates and values are shared by every pipeline
//! command and live in [`SourceArgs`].

use clap::Args;
use std::path::PathBuf;

use applier::phases::Sources;

pub mod apply;
pub mod completions;
pub mod render;

/// Template and values selection shared by `apply` and `render`
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Template file or directory; may be repeated
    #[arg(short, long = "path", value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// File prepended to every template before rendering
    #[arg(long, value_name = "FILE")]
    pub header: Option<PathBuf>,

    /// File, directory, or glob pattern to leave out; may be repeated
    #[arg(short = 'x', long, value_name = "PATH")]
    pub exclude: Vec<String>,

    /// Values file. Piped standard input is read when omitted.
    #[arg(short, long, value_name = "FILE", env = "APPLIER_VALUES")]
    pub values: Option<PathBuf>,
}

impl SourceArgs {
    pub fn into_sources(self) -> Sources {
        Sources {
            paths: self.paths,
            header: self.header,
            exclude: self.exclude,
            values: self.values,
        }
    }
}
