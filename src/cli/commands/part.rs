//! `indabom part` command - Part and assembly structure management

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use crate::bom::export::write_part_list_csv;
use crate::cli::helpers::{check_structure, format_money, load_workspace, resolve_part, truncate_str};
use crate::cli::output::{print_serialized, Table};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::catalog::{Catalog, PartId};
use crate::core::identity::PartNumber;
use crate::entities::part::Part;

#[derive(Subcommand, Debug)]
pub enum PartCommands {
    /// Create a new part
    New(NewArgs),

    /// List parts
    List(ListArgs),

    /// Show a part with its subparts and offers
    Show(ShowArgs),

    /// Add a subpart link to an assembly
    Add(AddArgs),

    /// Remove every link from an assembly to a subpart
    Rm(RmArgs),

    /// List assemblies that directly use a part
    WhereUsed(WhereUsedArgs),

    /// Export the part list as CSV
    Export(PartExportArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Part number (CLASS-NNNN-VV, e.g. 100-0001-01)
    pub number: PartNumber,

    /// Short description
    #[arg(long, short = 'd')]
    pub description: String,

    /// Revision
    #[arg(long, short = 'r', default_value = "1")]
    pub revision: String,

    /// Manufacturer name
    #[arg(long, short = 'm')]
    pub manufacturer: Option<String>,

    /// Manufacturer part number
    #[arg(long)]
    pub mpn: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only parts that have subparts
    #[arg(long)]
    pub assemblies: bool,

    /// Search in part number, description and MPN
    #[arg(long)]
    pub search: Option<String>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Part number
    pub number: String,
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Assembly part number
    pub assembly: String,

    /// Subpart part number
    pub subpart: String,

    /// Quantity of the subpart per assembly
    #[arg(long, short = 'c', default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub count: u32,
}

#[derive(clap::Args, Debug)]
pub struct RmArgs {
    /// Assembly part number
    pub assembly: String,

    /// Subpart part number
    pub subpart: String,
}

#[derive(clap::Args, Debug)]
pub struct WhereUsedArgs {
    /// Part number
    pub number: String,
}

#[derive(clap::Args, Debug)]
pub struct PartExportArgs {
    /// Output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(cmd: PartCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        PartCommands::New(args) => run_new(args, global),
        PartCommands::List(args) => run_list(args, global),
        PartCommands::Show(args) => run_show(args, global),
        PartCommands::Add(args) => run_add(args, global),
        PartCommands::Rm(args) => run_rm(args, global),
        PartCommands::WhereUsed(args) => run_where_used(args, global),
        PartCommands::Export(args) => run_export(args, global),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let (project, config, mut catalog) = load_workspace(global)?;

    let mut part = Part::new(args.number, args.description, args.revision);
    part.manufacturer = args.manufacturer;
    part.manufacturer_part_number = args.mpn.unwrap_or_default();
    part.apply_org_defaults(&config.org_context());

    let id = catalog.add_part(part)?;
    catalog.save(&project)?;

    if !global.quiet {
        let part = catalog.part(id);
        println!(
            "{} Created part {}",
            style("✓").green(),
            style(&part.number).cyan()
        );
        println!(
            "   {} | {}",
            style(truncate_str(&part.description, 40)).yellow(),
            part.manufacturer.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let (_, config, catalog) = load_workspace(global)?;

    let search = args.search.as_ref().map(|s| s.to_lowercase());
    let ids: Vec<PartId> = catalog
        .sorted_part_ids()
        .into_iter()
        .filter(|id| !args.assemblies || !catalog.subparts_of(*id).is_empty())
        .filter(|id| {
            let Some(search) = &search else { return true };
            let part = catalog.part(*id);
            part.number.to_string().to_lowercase().contains(search)
                || part.description.to_lowercase().contains(search)
                || part.manufacturer_part_number.to_lowercase().contains(search)
        })
        .collect();

    if args.count {
        println!("{}", ids.len());
        return Ok(());
    }

    if ids.is_empty() {
        if !global.quiet {
            println!("No parts found.");
        }
        return Ok(());
    }

    let format = global.format.resolve(config.default_format.as_deref(), OutputFormat::Tsv);
    match format {
        OutputFormat::Json | OutputFormat::Yaml => {
            let parts: Vec<&Part> = ids.iter().map(|id| catalog.part(*id)).collect();
            print_serialized(&parts, format)?;
        }
        _ => {
            let mut table = Table::new(&["part", "description", "rev", "manufacturer", "mpn", "subparts", "offers"]);
            for id in &ids {
                let part = catalog.part(*id);
                table.push(vec![
                    part.number.to_string(),
                    part.description.clone(),
                    part.revision.clone(),
                    part.manufacturer.clone().unwrap_or_else(|| "-".to_string()),
                    part.manufacturer_part_number.clone(),
                    catalog.subparts_of(*id).len().to_string(),
                    catalog.offers_for(*id).len().to_string(),
                ]);
            }
            print!("{}", table.render(format)?);
            if format == OutputFormat::Tsv && !global.quiet {
                println!();
                println!("{} part(s) found.", style(table.len()).cyan());
            }
        }
    }
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let (_, config, catalog) = load_workspace(global)?;
    let id = resolve_part(&catalog, &args.number)?;
    let part = catalog.part(id);

    let format = global.format.resolve(config.default_format.as_deref(), OutputFormat::Yaml);
    match format {
        OutputFormat::Yaml | OutputFormat::Json => print_serialized(part, format)?,
        _ => print_part_details(&catalog, id),
    }
    Ok(())
}

fn print_part_details(catalog: &Catalog, id: PartId) {
    let part = catalog.part(id);
    println!("{}", style("─".repeat(60)).dim());
    println!("{}: {}", style("Part").bold(), style(&part.number).cyan());
    println!("{}: {}", style("Description").bold(), style(&part.description).yellow());
    println!("{}: {}", style("Revision").bold(), part.revision);
    println!(
        "{}: {}",
        style("Manufacturer").bold(),
        part.manufacturer.as_deref().unwrap_or("-")
    );
    if !part.manufacturer_part_number.is_empty() {
        println!("{}: {}", style("MPN").bold(), part.manufacturer_part_number);
    }
    println!("{}", style("─".repeat(60)).dim());

    let links = catalog.subparts_of(id);
    if !links.is_empty() {
        println!();
        println!("{} ({}):", style("Subparts").bold(), links.len());
        for link in links {
            let sub = catalog.part(link.subpart);
            println!(
                "  • {} x{} {}",
                style(&sub.number).cyan(),
                link.count,
                style(truncate_str(&sub.description, 40)).dim()
            );
        }
    }

    let offers = catalog.offers_for(id);
    if !offers.is_empty() {
        println!();
        println!("{} ({}):", style("Offers").bold(), offers.len());
        for offer in offers {
            println!(
                "  • {} moq {} @ {}{}",
                style(&offer.seller).yellow(),
                offer.moq(),
                format_money(offer.unit_cost),
                if offer.ncnr { " (NCNR)" } else { "" }
            );
        }
    }

    let used_in = catalog.where_used(id);
    if !used_in.is_empty() {
        println!();
        println!("{}:", style("Used in").bold());
        for asm in used_in {
            println!("  • {}", style(&catalog.part(asm).number).cyan());
        }
    }
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let (project, config, mut catalog) = load_workspace(global)?;
    let assembly = resolve_part(&catalog, &args.assembly)?;
    let subpart = resolve_part(&catalog, &args.subpart)?;

    catalog.add_subpart(assembly, subpart, args.count);
    check_structure(&catalog, &config, assembly)?;
    catalog.save(&project)?;

    if !global.quiet {
        println!(
            "{} Added {} x{} to {}",
            style("✓").green(),
            style(&catalog.part(subpart).number).cyan(),
            args.count,
            style(&catalog.part(assembly).number).yellow()
        );
        println!("   Assembly now has {} subpart link(s)", catalog.subparts_of(assembly).len());
    }
    Ok(())
}

fn run_rm(args: RmArgs, global: &GlobalOpts) -> Result<()> {
    let (project, _, mut catalog) = load_workspace(global)?;
    let assembly = resolve_part(&catalog, &args.assembly)?;
    let subpart = resolve_part(&catalog, &args.subpart)?;

    let removed = catalog.remove_subpart(assembly, subpart);
    if removed == 0 {
        return Err(miette::miette!(
            "{} is not a subpart of {}",
            args.subpart,
            args.assembly
        ));
    }
    catalog.save(&project)?;

    if !global.quiet {
        println!(
            "{} Removed {} from {}",
            style("✓").green(),
            style(&catalog.part(subpart).number).cyan(),
            style(&catalog.part(assembly).number).yellow()
        );
    }
    Ok(())
}

fn run_where_used(args: WhereUsedArgs, global: &GlobalOpts) -> Result<()> {
    let (_, config, catalog) = load_workspace(global)?;
    let id = resolve_part(&catalog, &args.number)?;

    let assemblies = catalog.where_used(id);
    if assemblies.is_empty() {
        if !global.quiet {
            println!("{} is not used in any assembly.", args.number.trim());
        }
        return Ok(());
    }

    let format = global.format.resolve(config.default_format.as_deref(), OutputFormat::Tsv);
    let mut table = Table::new(&["assembly", "description", "count"]);
    for asm in assemblies {
        let count: u32 = catalog
            .subparts_of(asm)
            .iter()
            .filter(|l| l.subpart == id)
            .map(|l| l.count)
            .sum();
        let part = catalog.part(asm);
        table.push(vec![part.number.to_string(), part.description.clone(), count.to_string()]);
    }
    print!("{}", table.render(format)?);
    Ok(())
}

fn run_export(args: PartExportArgs, global: &GlobalOpts) -> Result<()> {
    let (_, _, catalog) = load_workspace(global)?;

    match args.output {
        Some(path) => {
            let file = File::create(&path).into_diagnostic()?;
            write_part_list_csv(&catalog, BufWriter::new(file)).into_diagnostic()?;
            if !global.quiet {
                println!(
                    "{} Exported {} part(s) to {}",
                    style("✓").green(),
                    catalog.len(),
                    style(path.display()).cyan()
                );
            }
        }
        None => write_part_list_csv(&catalog, std::io::stdout().lock()).into_diagnostic()?,
    }
    Ok(())
}
