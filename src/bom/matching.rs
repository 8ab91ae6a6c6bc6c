//! Offer matching against an external lookup
//!
//! A matcher takes a part and returns candidate offers for it, usually by
//! manufacturer part number. Candidates are stored with insert-if-absent
//! semantics, so running a match twice never duplicates offers.

use csv::ReaderBuilder;
use miette::Diagnostic;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::catalog::{Catalog, CatalogError, PartId};
use crate::core::identity::PartNumber;
use crate::entities::offer::{Offer, OfferSource};
use crate::entities::part::Part;

use super::csv_common::{build_header_map, get_field};

/// An offer found by a matcher, not yet tied to a stored part
#[derive(Debug, Clone, PartialEq)]
pub struct OfferCandidate {
    pub seller: String,
    pub source: OfferSource,
    pub minimum_order_quantity: Option<u64>,
    pub minimum_pack_quantity: Option<u64>,
    pub unit_cost: Option<Decimal>,
    pub lead_time_days: Option<u32>,
    pub ncnr: bool,
}

impl OfferCandidate {
    pub fn into_offer(self, part: PartNumber) -> Offer {
        let mut offer = Offer::new(part, self.seller);
        offer.source = self.source;
        offer.minimum_order_quantity = self.minimum_order_quantity;
        offer.minimum_pack_quantity = self.minimum_pack_quantity;
        offer.unit_cost = self.unit_cost;
        offer.lead_time_days = self.lead_time_days;
        offer.ncnr = self.ncnr;
        offer
    }
}

/// Source of candidate offers for a part
pub trait OfferMatcher {
    /// Candidate offers for `part`; an empty list means nothing matched
    fn match_offers(&self, part: &Part) -> Result<Vec<OfferCandidate>, MatchError>;
}

/// Matches parts by manufacturer part number against a CSV price list
///
/// Expected columns (case-insensitive): `manufacturer_part_number` and
/// `seller`, plus optional `moq`, `pack_qty`, `unit_cost`,
/// `lead_time_days` and `ncnr`.
#[derive(Debug, Default, Clone)]
pub struct PriceListMatcher {
    by_mpn: HashMap<String, Vec<OfferCandidate>>,
}

impl PriceListMatcher {
    pub fn from_path(path: &Path) -> Result<Self, MatchError> {
        let file = File::open(path).map_err(|source| MatchError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, MatchError> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let header_map = build_header_map(rdr.headers()?);

        let mut by_mpn: HashMap<String, Vec<OfferCandidate>> = HashMap::new();
        for (row_idx, result) in rdr.records().enumerate() {
            let row = row_idx + 2;
            let record = result?;
            let field = |name: &'static str| get_field(&record, &header_map, name);

            let (Some(mpn), Some(seller)) = (field("manufacturer_part_number"), field("seller")) else {
                continue;
            };

            let candidate = OfferCandidate {
                seller: seller.to_string(),
                source: OfferSource::Distributor,
                minimum_order_quantity: parse_opt(field("moq"), row, "moq")?,
                minimum_pack_quantity: parse_opt(field("pack_qty"), row, "pack_qty")?,
                unit_cost: parse_opt(field("unit_cost"), row, "unit_cost")?,
                lead_time_days: parse_opt(field("lead_time_days"), row, "lead_time_days")?,
                ncnr: field("ncnr").is_some_and(|v| matches!(v.to_lowercase().as_str(), "true" | "yes" | "1")),
            };
            by_mpn.entry(mpn.to_lowercase()).or_default().push(candidate);
        }

        tracing::debug!(mpns = by_mpn.len(), "price list loaded");
        Ok(Self { by_mpn })
    }
}

fn parse_opt<T: std::str::FromStr>(value: Option<&str>, row: usize, column: &'static str) -> Result<Option<T>, MatchError> {
    value
        .map(|v| {
            v.parse::<T>().map_err(|_| MatchError::InvalidRow {
                row,
                column,
                value: v.to_string(),
            })
        })
        .transpose()
}

impl OfferMatcher for PriceListMatcher {
    fn match_offers(&self, part: &Part) -> Result<Vec<OfferCandidate>, MatchError> {
        let mpn = part.manufacturer_part_number.trim();
        if mpn.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .by_mpn
            .get(&mpn.to_lowercase())
            .cloned()
            .unwrap_or_default())
    }
}

/// Counts from a match run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSummary {
    pub inserted: usize,
    pub duplicates: usize,
    /// Parts for which the matcher found nothing
    pub unmatched: Vec<PartNumber>,
}

/// Errors from matching offers
#[derive(Debug, Error, Diagnostic)]
pub enum MatchError {
    #[error("no offers found for {0} by manufacturer part number")]
    #[diagnostic(
        code(indabom::matching::no_matches),
        help("check the part's manufacturer_part_number")
    )]
    NoMatches(PartNumber),

    #[error("failed to open {path}: {source}")]
    #[diagnostic(code(indabom::matching::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read price list: {0}")]
    #[diagnostic(code(indabom::matching::csv))]
    Csv(#[from] csv::Error),

    #[error("price list row {row}: invalid {column} '{value}'")]
    #[diagnostic(code(indabom::matching::row))]
    InvalidRow {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("offer lookup failed: {0}")]
    #[diagnostic(code(indabom::matching::lookup))]
    Lookup(String),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Catalog(#[from] CatalogError),
}

fn store(catalog: &mut Catalog, number: &PartNumber, candidates: Vec<OfferCandidate>, summary: &mut MatchSummary) -> Result<(), MatchError> {
    for candidate in candidates {
        if catalog.insert_offer_if_absent(candidate.into_offer(number.clone()))? {
            summary.inserted += 1;
        } else {
            summary.duplicates += 1;
        }
    }
    Ok(())
}

/// Match one part, failing when the matcher finds nothing
pub fn match_part(catalog: &mut Catalog, part: PartId, matcher: &dyn OfferMatcher) -> Result<MatchSummary, MatchError> {
    let candidates = matcher.match_offers(catalog.part(part))?;
    let number = catalog.part(part).number.clone();
    if candidates.is_empty() {
        return Err(MatchError::NoMatches(number));
    }

    let mut summary = MatchSummary::default();
    store(catalog, &number, candidates, &mut summary)?;
    tracing::info!(part = %number, inserted = summary.inserted, duplicates = summary.duplicates, "matched offers");
    Ok(summary)
}

/// Match every direct subpart of an assembly
///
/// Each distinct subpart is looked up once; subparts without matches are
/// listed in the summary instead of failing the run.
pub fn match_subparts(catalog: &mut Catalog, assembly: PartId, matcher: &dyn OfferMatcher) -> Result<MatchSummary, MatchError> {
    let mut subparts: Vec<PartId> = Vec::new();
    for link in catalog.subparts_of(assembly) {
        if !subparts.contains(&link.subpart) {
            subparts.push(link.subpart);
        }
    }

    let mut summary = MatchSummary::default();
    for id in subparts {
        let candidates = matcher.match_offers(catalog.part(id))?;
        let number = catalog.part(id).number.clone();
        if candidates.is_empty() {
            tracing::debug!(part = %number, "no offers matched");
            summary.unmatched.push(number);
            continue;
        }
        store(catalog, &number, candidates, &mut summary)?;
    }

    tracing::info!(
        assembly = %catalog.part(assembly).number,
        inserted = summary.inserted,
        duplicates = summary.duplicates,
        unmatched = summary.unmatched.len(),
        "matched subpart offers"
    );
    Ok(summary)
}
