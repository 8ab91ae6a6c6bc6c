//! `indabom offer` command - Distributor and seller offers

use clap::Subcommand;
use console::style;
use miette::Result;
use rust_decimal::Decimal;
use std::path::PathBuf;

use crate::bom::matching::{match_part, match_subparts, MatchSummary, PriceListMatcher};
use crate::cli::helpers::{format_money, load_workspace, resolve_part};
use crate::cli::output::{cell, print_serialized, Table};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::entities::offer::{Offer, OfferSource};

#[derive(Subcommand, Debug)]
pub enum OfferCommands {
    /// Record a new offer for a part
    New(NewArgs),

    /// List offers, optionally for one part
    List(ListArgs),

    /// Fill in offers from a distributor price list
    Match(MatchArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Part number the offer sells
    pub part: String,

    /// Distributor or seller name
    #[arg(long, short = 's')]
    pub seller: String,

    /// Offer source (distributor or seller)
    #[arg(long, default_value = "distributor")]
    pub source: OfferSource,

    /// Minimum order quantity
    #[arg(long)]
    pub moq: Option<u64>,

    /// Minimum pack quantity
    #[arg(long)]
    pub pack_qty: Option<u64>,

    /// Unit cost (e.g. 0.10)
    #[arg(long)]
    pub unit_cost: Option<Decimal>,

    /// Lead time in days
    #[arg(long)]
    pub lead_time: Option<u32>,

    /// One-off engineering cost
    #[arg(long)]
    pub nre: Option<Decimal>,

    /// Non-cancellable / non-returnable
    #[arg(long)]
    pub ncnr: bool,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only offers for this part
    pub part: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct MatchArgs {
    /// Part (or assembly with --subparts) to match
    pub part: String,

    /// Price list CSV keyed by manufacturer part number
    #[arg(long)]
    pub price_list: PathBuf,

    /// Match every direct subpart of the assembly instead of the part itself
    #[arg(long)]
    pub subparts: bool,
}

pub fn run(cmd: OfferCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        OfferCommands::New(args) => run_new(args, global),
        OfferCommands::List(args) => run_list(args, global),
        OfferCommands::Match(args) => run_match(args, global),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let (project, _, mut catalog) = load_workspace(global)?;
    let part = resolve_part(&catalog, &args.part)?;

    let mut offer = Offer::new(catalog.part(part).number.clone(), args.seller);
    offer.source = args.source;
    offer.minimum_order_quantity = args.moq;
    offer.minimum_pack_quantity = args.pack_qty;
    offer.unit_cost = args.unit_cost;
    offer.lead_time_days = args.lead_time;
    offer.nre_cost = args.nre;
    offer.ncnr = args.ncnr;

    let id = offer.id;
    let seller = offer.seller.clone();
    if !catalog.insert_offer_if_absent(offer)? {
        if !global.quiet {
            println!(
                "{} {} already has an equivalent offer from {}",
                style("!").yellow(),
                style(&catalog.part(part).number).cyan(),
                seller
            );
        }
        return Ok(());
    }
    catalog.save(&project)?;

    if !global.quiet {
        println!(
            "{} Created offer {}",
            style("✓").green(),
            style(id).cyan()
        );
        println!(
            "   {} | {} | moq {} @ {}",
            style(&catalog.part(part).number).yellow(),
            seller,
            cell(args.moq),
            format_money(args.unit_cost)
        );
    }
    Ok(())
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let (_, config, catalog) = load_workspace(global)?;

    let parts = match &args.part {
        Some(number) => vec![resolve_part(&catalog, number)?],
        None => catalog.sorted_part_ids(),
    };
    let offers: Vec<&Offer> = parts
        .iter()
        .flat_map(|id| catalog.offers_for(*id))
        .collect();

    if offers.is_empty() {
        if !global.quiet {
            println!("No offers found.");
        }
        return Ok(());
    }

    let format = global.format.resolve(config.default_format.as_deref(), OutputFormat::Tsv);
    match format {
        OutputFormat::Json | OutputFormat::Yaml => print_serialized(&offers, format)?,
        _ => {
            let mut table = Table::new(&["id", "part", "seller", "source", "moq", "pack", "unit cost", "lead", "ncnr"]);
            for offer in &offers {
                table.push(vec![
                    offer.id.to_string(),
                    offer.part.to_string(),
                    offer.seller.clone(),
                    offer.source.to_string(),
                    cell(offer.minimum_order_quantity),
                    cell(offer.minimum_pack_quantity),
                    format_money(offer.unit_cost),
                    cell(offer.lead_time_days),
                    if offer.ncnr { "yes" } else { "no" }.to_string(),
                ]);
            }
            print!("{}", table.render(format)?);
            if format == OutputFormat::Tsv && !global.quiet {
                println!();
                println!("{} offer(s) found.", style(table.len()).cyan());
            }
        }
    }
    Ok(())
}

fn run_match(args: MatchArgs, global: &GlobalOpts) -> Result<()> {
    let (project, _, mut catalog) = load_workspace(global)?;
    let part = resolve_part(&catalog, &args.part)?;
    let matcher = PriceListMatcher::from_path(&args.price_list)?;

    let summary = if args.subparts {
        match_subparts(&mut catalog, part, &matcher)?
    } else {
        match_part(&mut catalog, part, &matcher)?
    };
    catalog.save(&project)?;

    if !global.quiet {
        print_match_summary(&summary);
    }
    Ok(())
}

fn print_match_summary(summary: &MatchSummary) {
    println!(
        "{} Matched {} new offer(s)",
        style("✓").green(),
        style(summary.inserted).cyan()
    );
    if summary.duplicates > 0 {
        println!("   {} already recorded", summary.duplicates);
    }
    if !summary.unmatched.is_empty() {
        println!();
        println!("{} No offers for:", style("!").yellow());
        for number in &summary.unmatched {
            println!("  • {}", style(number).cyan());
        }
    }
}
