//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use applier::output::OutputConfig;

use crate::commands;

/// Applier - Render templated resource manifests and apply them to a cluster
#[derive(Parser, Debug)]
#[command(name = "applier")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(
        long,
        global = true,
        value_name = "WHEN",
        default_value = "auto",
        value_parser = ["auto", "always", "never"]
    )]
    color: String,

    /// Set log level (error, warn, info, debug, trace). RUST_LOG overrides it.
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply templated resources to the cluster
    Apply(commands::apply::ApplyArgs),

    /// Render templated resources without touching the cluster
    Render(commands::render::RenderArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        let output = OutputConfig::from_env_and_flag(&self.color);
        init_logging(&self.log_level, &output);

        match self.command {
            Commands::Apply(args) => commands::apply::execute(args, &output),
            Commands::Render(args) => commands::render::execute(args, &output),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

/// Send log records to stderr at `level`, letting `RUST_LOG` override it.
fn init_logging(level: &str, output: &OutputConfig) {
    let style = if output.use_color {
        env_logger::WriteStyle::Always
    } else {
        env_logger::WriteStyle::Never
    };

    // Ignored when a logger is already installed in this process.
    let _ = env_logger::Builder::new()
        .parse_filters(level)
        .parse_default_env()
        .write_style(style)
        .format_timestamp(None)
        .target(env_logger::Target::Stderr)
        .try_init();
}
