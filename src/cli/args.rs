//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    completions::CompletionsArgs, export::ExportArgs, import::ImportArgs, indented::IndentedArgs,
    init::InitArgs, offer::OfferCommands, part::PartCommands,
};

#[derive(Parser)]
#[command(name = "indabom")]
#[command(author, version, about = "Indented bills of materials with sourcing and cost rollup")]
#[command(long_about = "Manage parts, assembly structure and distributor offers as plain YAML files, \
and cost an assembly at a build quantity with price breaks applied per line.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .indabom/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new IndaBOM project
    Init(InitArgs),

    /// Part and assembly structure management
    #[command(subcommand)]
    Part(PartCommands),

    /// Distributor and seller offers
    #[command(subcommand)]
    Offer(OfferCommands),

    /// Show the costed indented BOM of an assembly
    Indented(IndentedArgs),

    /// Export the costed indented BOM of an assembly as CSV
    Export(ExportArgs),

    /// Replace an assembly's subparts from a CSV file
    Import(ImportArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (yaml for show, tsv for lists)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
}

impl OutputFormat {
    /// Resolve `Auto` against the configured default, then the command's own default
    pub fn resolve(self, configured: Option<&str>, fallback: OutputFormat) -> OutputFormat {
        if self != OutputFormat::Auto {
            return self;
        }
        configured
            .and_then(|s| OutputFormat::from_str(s, true).ok())
            .filter(|f| *f != OutputFormat::Auto)
            .unwrap_or(fallback)
    }
}
