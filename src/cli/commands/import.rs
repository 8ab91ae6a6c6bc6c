//! `indabom import` command - Replace an assembly's subparts from CSV

use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::path::PathBuf;

use crate::bom::import::{apply, parse_subparts};
use crate::cli::helpers::{check_structure, load_workspace, resolve_part};
use crate::cli::GlobalOpts;

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// Assembly whose subparts are replaced
    pub part: String,

    /// CSV file with part_number and quantity columns
    pub file: PathBuf,

    /// Validate without making changes
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: ImportArgs, global: &GlobalOpts) -> Result<()> {
    let (project, config, mut catalog) = load_workspace(global)?;
    let assembly = resolve_part(&catalog, &args.part)?;

    let file = File::open(&args.file).into_diagnostic()?;
    let plan = parse_subparts(&catalog, file)?;

    if args.dry_run {
        println!(
            "{} Dry run: would replace {} link(s) of {} with:",
            style("→").blue(),
            catalog.subparts_of(assembly).len(),
            style(&catalog.part(assembly).number).cyan()
        );
        for link in &plan.links {
            println!(
                "  {} Row {}: {} x{}",
                style("○").dim(),
                link.row,
                style(&catalog.part(link.subpart).number).cyan(),
                link.count
            );
        }
        if plan.skipped > 0 {
            println!("  {} row(s) skipped", plan.skipped);
        }
        return Ok(());
    }

    let summary = apply(&mut catalog, assembly, plan);
    check_structure(&catalog, &config, assembly)?;
    catalog.save(&project)?;

    if !global.quiet {
        println!(
            "{} Replaced subparts of {}",
            style("✓").green(),
            style(&catalog.part(assembly).number).cyan()
        );
        println!("   Removed: {}", summary.removed);
        println!("   Added:   {}", style(summary.added).green());
        if summary.skipped > 0 {
            println!("   Skipped: {} row(s)", style(summary.skipped).yellow());
        }
    }
    Ok(())
}
