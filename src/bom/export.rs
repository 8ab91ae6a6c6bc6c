//! CSV export of indented BOMs and the flat part list

use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

use crate::core::catalog::Catalog;
use crate::entities::offer::Offer;

use super::cost::CostReport;

/// Column order of the indented BOM export
pub const INDENTED_HEADERS: &[&str] = &[
    "level",
    "part_number",
    "quantity",
    "part_description",
    "part_revision",
    "part_manufacturer",
    "part_manufacturer_part_number",
    "part_ext_qty",
    "part_order_qty",
    "part_seller",
    "part_cost",
    "part_ext_cost",
];

/// Column order of the part list export
pub const PART_LIST_HEADERS: &[&str] = &[
    "part_number",
    "part_description",
    "part_revision",
    "part_manufacturer",
    "part_manufacturer_part_number",
    "part_minimum_order_quantity",
    "part_minimum_pack_quantity",
    "part_unit_cost",
];

/// One exported line of an indented BOM
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndentedRow {
    pub level: usize,
    pub part_number: String,
    pub quantity: u64,
    pub part_description: String,
    pub part_revision: String,
    pub part_manufacturer: String,
    pub part_manufacturer_part_number: String,
    pub part_ext_qty: u64,
    pub part_order_qty: Option<u64>,
    pub part_seller: Option<String>,
    pub part_cost: Option<Decimal>,
    pub part_ext_cost: Option<Decimal>,
}

/// One exported part of the part list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartListRow {
    pub part_number: String,
    pub part_description: String,
    pub part_revision: String,
    pub part_manufacturer: String,
    pub part_manufacturer_part_number: String,
    pub part_minimum_order_quantity: Option<u64>,
    pub part_minimum_pack_quantity: Option<u64>,
    pub part_unit_cost: Option<Decimal>,
}

/// Flatten a cost report into export rows, one per expanded line
pub fn indented_rows(report: &CostReport, catalog: &Catalog) -> Vec<IndentedRow> {
    report
        .rollup
        .lines
        .iter()
        .map(|line| {
            let part = catalog.part(line.item.part);
            IndentedRow {
                level: line.item.indent_level,
                part_number: part.number.to_string(),
                quantity: line.item.quantity,
                part_description: part.description.clone(),
                part_revision: part.revision.clone(),
                part_manufacturer: part.manufacturer.clone().unwrap_or_default(),
                part_manufacturer_part_number: part.manufacturer_part_number.clone(),
                part_ext_qty: line.extended_quantity,
                part_order_qty: line.order_quantity,
                part_seller: line.offer.as_ref().map(|o| o.seller.clone()),
                part_cost: line.unit_price,
                part_ext_cost: line.extended_cost,
            }
        })
        .collect()
}

/// Flat part list ordered by part number
///
/// Sourcing columns come from the part's cheapest priced offer, if any.
pub fn part_list_rows(catalog: &Catalog) -> Vec<PartListRow> {
    catalog
        .sorted_part_ids()
        .into_iter()
        .map(|id| {
            let part = catalog.part(id);
            let best = cheapest_offer(catalog.offers_for(id));
            PartListRow {
                part_number: part.number.to_string(),
                part_description: part.description.clone(),
                part_revision: part.revision.clone(),
                part_manufacturer: part.manufacturer.clone().unwrap_or_default(),
                part_manufacturer_part_number: part.manufacturer_part_number.clone(),
                part_minimum_order_quantity: best.and_then(|o| o.minimum_order_quantity),
                part_minimum_pack_quantity: best.and_then(|o| o.minimum_pack_quantity),
                part_unit_cost: best.and_then(|o| o.unit_cost),
            }
        })
        .collect()
}

fn cheapest_offer(offers: &[Offer]) -> Option<&Offer> {
    offers
        .iter()
        .filter(|o| o.unit_cost.is_some())
        .fold(None, |best: Option<&Offer>, o| match best {
            Some(b) if b.unit_cost <= o.unit_cost => Some(b),
            _ => Some(o),
        })
}

/// Write a costed, indented BOM as CSV
pub fn write_indented_csv<W: Write>(report: &CostReport, catalog: &Catalog, writer: W) -> Result<(), csv::Error> {
    write_rows(INDENTED_HEADERS, &indented_rows(report, catalog), writer)
}

/// Write the flat part list as CSV
pub fn write_part_list_csv<W: Write>(catalog: &Catalog, writer: W) -> Result<(), csv::Error> {
    write_rows(PART_LIST_HEADERS, &part_list_rows(catalog), writer)
}

fn write_rows<W: Write, R: Serialize>(headers: &[&str], rows: &[R], writer: W) -> Result<(), csv::Error> {
    // Header written by hand so an empty export still carries it
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(headers)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}
