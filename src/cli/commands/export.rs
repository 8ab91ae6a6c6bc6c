//! `indabom export` command - Write the costed indented BOM as CSV

use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use crate::bom::cost::cost_assembly;
use crate::bom::export::write_indented_csv;
use crate::cli::commands::indented::cost_options;
use crate::cli::helpers::{load_workspace, resolve_part};
use crate::cli::GlobalOpts;

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Assembly part number
    pub part: String,

    /// Number of assemblies to build (default: from config, else 100)
    #[arg(long, short = 'n')]
    pub qty: Option<u64>,

    /// Deepest nesting level to expand (default: from config)
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Consider offers in the order they were recorded instead of by MOQ
    #[arg(long)]
    pub listed: bool,

    /// Output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(args: ExportArgs, global: &GlobalOpts) -> Result<()> {
    let (_, config, catalog) = load_workspace(global)?;
    let root = resolve_part(&catalog, &args.part)?;

    let build_quantity = args.qty.unwrap_or_else(|| config.build_quantity());
    let options = cost_options(&config, args.max_depth, args.listed);
    let report = cost_assembly(&catalog, root, build_quantity, &options)?;

    match args.output {
        Some(path) => {
            let file = File::create(&path).into_diagnostic()?;
            write_indented_csv(&report, &catalog, BufWriter::new(file)).into_diagnostic()?;
            if !global.quiet {
                println!(
                    "{} Exported {} line(s) of {} to {}",
                    style("✓").green(),
                    report.rollup.lines.len(),
                    style(&catalog.part(root).number).cyan(),
                    style(path.display()).cyan()
                );
            }
        }
        None => write_indented_csv(&report, &catalog, std::io::stdout().lock()).into_diagnostic()?,
    }
    Ok(())
}
