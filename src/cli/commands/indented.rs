//! `indabom indented` command - Costed indented BOM of an assembly

use console::style;
use miette::{IntoDiagnostic, Result};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::bom::cost::{cost_assembly, CostOptions, CostReport};
use crate::bom::expand::ExpandOptions;
use crate::bom::export::{indented_rows, write_indented_csv, IndentedRow};
use crate::bom::price::OfferOrder;
use crate::bom::rollup::RolledLine;
use crate::cli::helpers::{format_money, load_workspace, resolve_part};
use crate::cli::output::{cell, print_serialized, Table};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::catalog::Catalog;
use crate::core::Config;

#[derive(clap::Args, Debug)]
pub struct IndentedArgs {
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
}

/// Structured form of an indented BOM for JSON/YAML output
#[derive(Debug, Serialize)]
struct IndentedReport {
    part: String,
    build_quantity: u64,
    lines: Vec<IndentedRow>,
    unit_cost_total: Decimal,
    extended_cost_total: Decimal,
    is_complete: bool,
}

/// Cost options from config, overridden by command-line flags
pub(crate) fn cost_options(config: &Config, max_depth: Option<usize>, listed: bool) -> CostOptions {
    CostOptions {
        expand: ExpandOptions {
            max_depth: Some(max_depth.unwrap_or_else(|| config.max_depth())),
            detect_cycles: true,
        },
        offer_order: if listed {
            OfferOrder::Listed
        } else {
            config.offer_order()
        },
    }
}

pub fn run(args: IndentedArgs, global: &GlobalOpts) -> Result<()> {
    let (_, config, catalog) = load_workspace(global)?;
    let root = resolve_part(&catalog, &args.part)?;

    let build_quantity = args.qty.unwrap_or_else(|| config.build_quantity());
    let options = cost_options(&config, args.max_depth, args.listed);
    let report = cost_assembly(&catalog, root, build_quantity, &options)?;

    let format = global.format.resolve(config.default_format.as_deref(), OutputFormat::Tsv);
    match format {
        OutputFormat::Json | OutputFormat::Yaml => {
            let structured = IndentedReport {
                part: catalog.part(root).number.to_string(),
                build_quantity,
                lines: indented_rows(&report, &catalog),
                unit_cost_total: report.rollup.unit_cost_total,
                extended_cost_total: report.rollup.extended_cost_total,
                is_complete: report.is_complete(),
            };
            print_serialized(&structured, format)?;
        }
        OutputFormat::Csv => {
            write_indented_csv(&report, &catalog, std::io::stdout().lock()).into_diagnostic()?;
        }
        _ => print_table(&report, &catalog, format, global.quiet)?,
    }
    Ok(())
}

fn print_table(report: &CostReport, catalog: &Catalog, format: OutputFormat, quiet: bool) -> Result<()> {
    let mut table = Table::new(&[
        "level", "part", "qty", "description", "seller", "ext qty", "order qty", "unit cost", "ext cost",
    ]);
    for row in indented_rows(report, catalog) {
        table.push(vec![
            row.level.to_string(),
            format!("{}{}", "  ".repeat(row.level), row.part_number),
            row.quantity.to_string(),
            row.part_description,
            row.part_seller.unwrap_or_else(|| "-".to_string()),
            row.part_ext_qty.to_string(),
            cell(row.part_order_qty),
            format_money(row.part_cost),
            format_money(row.part_ext_cost),
        ]);
    }
    print!("{}", table.render(format)?);

    if quiet {
        return Ok(());
    }

    let rollup = &report.rollup;
    println!();
    println!(
        "{}: {}",
        style("Unit cost").bold(),
        style(format_money(Some(rollup.unit_cost_total))).green()
    );
    println!(
        "{} (x{}): {}",
        style("Extended cost").bold(),
        report.build_quantity,
        style(format_money(Some(rollup.extended_cost_total))).green()
    );

    let numbers = |lines: Vec<&RolledLine>| -> Vec<String> {
        lines
            .into_iter()
            .map(|line| catalog.part(line.item.part).number.to_string())
            .collect()
    };

    if !report.is_complete() {
        let missing = numbers(rollup.unsourced().collect());
        println!();
        println!(
            "{} Incomplete: {} line(s) without an offer: {}",
            style("!").yellow(),
            missing.len(),
            missing.join(", ")
        );
    }

    let uncosted = numbers(rollup.unpriced().filter(|l| l.offer.is_some()).collect());
    if !uncosted.is_empty() {
        println!(
            "{} {} offered line(s) have no unit cost: {}",
            style("!").yellow(),
            uncosted.len(),
            uncosted.join(", ")
        );
    }
    Ok(())
}
