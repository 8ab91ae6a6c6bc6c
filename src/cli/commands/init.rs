//! `indabom init` command - Initialize a new IndaBOM project

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::core::project::{Project, ProjectError};
use crate::entities::{Offer, Part};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Organization that manufactures in-house parts
    #[arg(long)]
    pub organization: Option<String>,

    /// Rewrite the default config even if .indabom/ already exists
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    std::fs::create_dir_all(&args.path).into_diagnostic()?;

    let result = if args.force {
        Project::init_force(&args.path)
    } else {
        Project::init(&args.path)
    };

    let project = match result {
        Ok(project) => project,
        Err(ProjectError::AlreadyExists(root)) => {
            println!(
                "{} {} is already an IndaBOM project (use {} to reset its config)",
                style("!").yellow(),
                style(root.display()).cyan(),
                style("indabom init --force").yellow()
            );
            return Ok(());
        }
        Err(e) => return Err(miette::miette!("{}", e)),
    };

    if let Some(org) = &args.organization {
        set_organization(&project, org)?;
    }

    println!(
        "{} Initialized IndaBOM project at {}",
        style("✓").green(),
        style(project.root().display()).cyan()
    );
    for dir in [project.config_dir(), project.entity_dir::<Part>(), project.entity_dir::<Offer>()] {
        let shown = dir.strip_prefix(project.root()).unwrap_or(&dir);
        println!("  {}/", style(shown.display()).dim());
    }

    println!();
    println!("Next: {}", style("indabom part new 100-0001-01 --description \"Resistor 10k\"").yellow());
    Ok(())
}

/// Replace the commented-out organization in a fresh config
fn set_organization(project: &Project, org: &str) -> Result<()> {
    let path = project.config_dir().join("config.yaml");
    let config = std::fs::read_to_string(&path).into_diagnostic()?;
    let value = serde_yml::to_string(org).into_diagnostic()?;
    let line = format!("organization: {}", value.trim_end());

    let updated: Vec<String> = config
        .lines()
        .map(|l| {
            if l.trim_start().starts_with("# organization:") {
                line.clone()
            } else {
                l.to_string()
            }
        })
        .collect();
    std::fs::write(&path, updated.join("\n") + "\n").into_diagnostic()?;
    Ok(())
}
