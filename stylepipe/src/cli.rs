// stylepipe/src/cli.rs
//! This file defines the command-line interface (CLI) for the stylepipe application,
//! including all available commands and their arguments.
//! License: MIT OR Apache-2.0

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "stylepipe",
    author = "Stylepipe Team",
    version = env!("CARGO_PKG_VERSION"),
    about = "Compile, clean up, and prefix stylesheets by build target",
    long_about = "Stylepipe compiles SCSS sources into plain CSS, adds vendor prefixes for the configured browsers, and optionally writes source maps. Sources are partitioned into named targets by glob so a slow compilation unit can be built apart from the fast ones. Targets that opt in get a cleanup pass that collapses duplicated selector fragments left behind by `~` expansion.",
    arg_required_else_help = true,
)]
pub struct Cli {
    /// Disable informational messages
    #[arg(long, short = 'q', global = true, help = "Suppress all informational and debug messages.")]
    pub quiet: bool,

    /// Enable debug logging (overrides RUST_LOG for stylepipe crates to DEBUG)
    #[arg(long, short = 'd', global = true, help = "Enable debug logging.")]
    pub debug: bool,

    /// Explicitly disable debug logging, even if RUST_LOG is set to DEBUG
    #[arg(long = "disable-debug", global = true, help = "Disable debug logging, overriding RUST_LOG.")]
    pub disable_debug: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// All available commands for the `stylepipe` CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Builds the selected targets (all of them when none are named).
    #[command(about = "Builds the selected targets (all of them when none are named).")]
    Build(BuildCommand),

    /// Collapses duplicated selector fragments in compiled CSS.
    #[command(about = "Collapses duplicated selector fragments in compiled CSS read from a file or stdin.")]
    Dedupe(DedupeCommand),

    /// Lists targets and the files each would compile.
    #[command(about = "Lists targets and the files each would compile.")]
    Targets(TargetsCommand),
}

/// Options shared by commands that load the pipeline configuration.
#[derive(Parser, Debug, Clone)]
pub struct ProjectArgs {
    /// Path to a pipeline configuration file (YAML).
    #[arg(long = "config", short = 'c', value_name = "FILE", env = "STYLEPIPE_CONFIG", help = "Path to a pipeline configuration file (YAML).")]
    pub config: Option<PathBuf>,

    /// Project root that globs and output directories are resolved against.
    #[arg(long = "root", short = 'r', value_name = "DIR", help = "Project root (defaults to the config file's directory, or the current directory).")]
    pub root: Option<PathBuf>,
}

/// Arguments for the `build` command.
#[derive(Parser, Debug)]
pub struct BuildCommand {
    /// Target names to build, e.g. `fast` or `slow`.
    #[arg(value_name = "TARGET", help = "Names of the targets to build (default: all).")]
    pub targets: Vec<String>,

    #[command(flatten)]
    pub project: ProjectArgs,

    /// Override the browser queries used for prefixing (comma-separated).
    #[arg(long = "browsers", value_delimiter = ',', value_name = "QUERY", help = "Override the browserslist queries (comma-separated).")]
    pub browsers: Vec<String>,

    /// Skip writing source maps for every target.
    #[arg(long = "no-source-maps", help = "Do not write source maps, whatever the targets say.")]
    pub no_source_maps: bool,

    /// Resolve targets and print the plan without compiling anything.
    #[arg(long = "dry-run", help = "Show what would be built without writing files.")]
    pub dry_run: bool,

    /// Print the build report as JSON on stdout.
    #[arg(long = "json", help = "Print the build report as JSON on stdout.")]
    pub json: bool,
}

/// Arguments for the `dedupe` command.
#[derive(Parser, Debug)]
pub struct DedupeCommand {
    /// Path to an input file (reads from stdin if not provided).
    #[arg(long, short = 'i', value_name = "FILE", help = "Read input from a specified file instead of stdin.")]
    pub input_file: Option<PathBuf>,

    /// Write output to this file instead of stdout.
    #[arg(long, short = 'o', value_name = "FILE", help = "Write output to a specified file instead of stdout.")]
    pub output: Option<PathBuf>,

    /// Show a unified diff of the collapsed selectors instead of the output.
    #[arg(long, short = 'D', help = "Show a unified diff to highlight the changes made.")]
    pub diff: bool,
}

/// Arguments for the `targets` command.
#[derive(Parser, Debug)]
pub struct TargetsCommand {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Print the listing as JSON on stdout.
    #[arg(long = "json", help = "Print targets and their files as JSON.")]
    pub json: bool,
}
