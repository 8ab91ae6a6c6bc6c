//! CSV import that redefines an assembly's subpart set

use csv::ReaderBuilder;
use miette::Diagnostic;
use std::io::Read;
use thiserror::Error;

use crate::core::catalog::{Catalog, PartId};
use crate::core::identity::{PartNumber, PartNumberError};

use super::csv_common::{build_header_map, get_field};

/// One validated import row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportedLink {
    /// CSV line number (header is line 1)
    pub row: usize,
    pub subpart: PartId,
    pub count: u32,
}

/// Parsed import, ready to apply
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportPlan {
    pub links: Vec<ImportedLink>,
    /// Rows without a part number or quantity, or below the top level
    pub skipped: usize,
}

/// Outcome of an applied import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub removed: usize,
    pub added: usize,
    pub skipped: usize,
}

/// Errors aborting an import; nothing is changed when one is returned
#[derive(Debug, Error, Diagnostic)]
pub enum ImportError {
    #[error("failed to read CSV: {0}")]
    #[diagnostic(code(indabom::import::csv))]
    Csv(#[from] csv::Error),

    #[error("CSV has no '{0}' column")]
    #[diagnostic(
        code(indabom::import::missing_column),
        help("the header row needs at least 'part_number' and 'quantity'")
    )]
    MissingColumn(&'static str),

    #[error("row {row}: {source}")]
    #[diagnostic(code(indabom::import::part_number))]
    InvalidPartNumber {
        row: usize,
        #[source]
        source: PartNumberError,
    },

    #[error("row {row}: part not found: {part}")]
    #[diagnostic(
        code(indabom::import::unknown_part),
        help("create the part first with `indabom part new`")
    )]
    UnknownPart { row: usize, part: PartNumber },

    #[error("row {row}: invalid quantity '{value}': expected a whole number of at least 1")]
    #[diagnostic(code(indabom::import::quantity))]
    InvalidQuantity { row: usize, value: String },

    #[error("row {row}: invalid level '{value}'")]
    #[diagnostic(code(indabom::import::level))]
    InvalidLevel { row: usize, value: String },
}

/// Read and validate every row without touching the catalog
///
/// When a `level` column is present only level-1 rows are used, so an
/// exported indented BOM imports as its top-level subpart set.
pub fn parse_subparts<R: Read>(catalog: &Catalog, reader: R) -> Result<ImportPlan, ImportError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let header_map = build_header_map(rdr.headers()?);
    for required in ["part_number", "quantity"] {
        if !header_map.contains_key(required) {
            return Err(ImportError::MissingColumn(required));
        }
    }
    let has_level = header_map.contains_key("level");

    let mut plan = ImportPlan::default();
    for (row_idx, result) in rdr.records().enumerate() {
        let row = row_idx + 2;
        let record = result?;

        let (Some(number), Some(quantity)) = (
            get_field(&record, &header_map, "part_number"),
            get_field(&record, &header_map, "quantity"),
        ) else {
            plan.skipped += 1;
            continue;
        };

        if has_level {
            let level = get_field(&record, &header_map, "level").unwrap_or_default();
            let level: usize = level.parse().map_err(|_| ImportError::InvalidLevel {
                row,
                value: level.to_string(),
            })?;
            if level != 1 {
                plan.skipped += 1;
                continue;
            }
        }

        let number: PartNumber = number
            .parse()
            .map_err(|source| ImportError::InvalidPartNumber { row, source })?;
        let subpart = catalog
            .part_id(&number)
            .ok_or(ImportError::UnknownPart { row, part: number })?;
        let count = quantity
            .parse::<u32>()
            .ok()
            .filter(|c| *c >= 1)
            .ok_or_else(|| ImportError::InvalidQuantity {
                row,
                value: quantity.to_string(),
            })?;

        plan.links.push(ImportedLink { row, subpart, count });
    }

    Ok(plan)
}

/// Replace the subparts of `assembly` with the rows of a CSV
///
/// Existing links are dropped, not merged. An empty row set leaves the
/// assembly with no subparts.
pub fn import_subparts<R: Read>(catalog: &mut Catalog, assembly: PartId, reader: R) -> Result<ImportSummary, ImportError> {
    let plan = parse_subparts(catalog, reader)?;
    Ok(apply(catalog, assembly, plan))
}

/// Apply a validated plan
pub fn apply(catalog: &mut Catalog, assembly: PartId, plan: ImportPlan) -> ImportSummary {
    let removed = catalog.subparts_of(assembly).len();
    let added = plan.links.len();
    catalog.replace_subparts(
        assembly,
        plan.links.into_iter().map(|l| (l.subpart, l.count)).collect(),
    );
    tracing::debug!(
        assembly = %catalog.part(assembly).number,
        removed,
        added,
        "replaced subparts"
    );
    ImportSummary {
        removed,
        added,
        skipped: plan.skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bom::cost::{cost_assembly, CostOptions};
    use crate::bom::export::write_indented_csv;
    use crate::entities::part::Part;

    fn catalog() -> (Catalog, PartId) {
        let mut catalog = Catalog::new();
        let top = catalog
            .add_part(Part::new("300-0001-01".parse().unwrap(), "Board", "A"))
            .unwrap();
        for n in ["100-0001-01", "100-0002-01", "200-0001-01"] {
            catalog
                .add_part(Part::new(n.parse().unwrap(), n, "A"))
                .unwrap();
        }
        (catalog, top)
    }

    fn links(catalog: &Catalog, assembly: PartId) -> Vec<(String, u32)> {
        catalog
            .subparts_of(assembly)
            .iter()
            .map(|l| (catalog.part(l.subpart).number.to_string(), l.count))
            .collect()
    }

    #[test]
    fn test_import_replaces_existing_links() {
        let (mut catalog, top) = catalog();
        let old = catalog.resolve_str("200-0001-01").unwrap();
        catalog.add_subpart(top, old, 9);

        let csv = "Part_Number , QUANTITY\n100-0001-01,2\n100-0002-01,1\n";
        let summary = import_subparts(&mut catalog, top, csv.as_bytes()).unwrap();

        assert_eq!(summary.removed, 1);
        assert_eq!(summary.added, 2);
        assert_eq!(
            links(&catalog, top),
            vec![("100-0001-01".to_string(), 2), ("100-0002-01".to_string(), 1)]
        );
    }

    #[test]
    fn test_empty_import_clears_links() {
        let (mut catalog, top) = catalog();
        let res = catalog.resolve_str("100-0001-01").unwrap();
        catalog.add_subpart(top, res, 3);

        let summary = import_subparts(&mut catalog, top, "part_number,quantity\n".as_bytes()).unwrap();
        assert_eq!(summary.removed, 1);
        assert!(catalog.subparts_of(top).is_empty());
    }

    #[test]
    fn test_unknown_part_aborts_without_changes() {
        let (mut catalog, top) = catalog();
        let res = catalog.resolve_str("100-0001-01").unwrap();
        catalog.add_subpart(top, res, 3);

        let csv = "part_number,quantity\n100-0002-01,1\n100-0099-01,1\n";
        let err = import_subparts(&mut catalog, top, csv.as_bytes()).unwrap_err();
        assert!(matches!(err, ImportError::UnknownPart { row: 3, .. }));
        assert_eq!(links(&catalog, top), vec![("100-0001-01".to_string(), 3)]);
    }

    #[test]
    fn test_malformed_rows_are_rejected() {
        let (catalog, _) = catalog();

        let err = parse_subparts(&catalog, "part_number,quantity\n100-1-01,1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, ImportError::InvalidPartNumber { row: 2, .. }));

        let err = parse_subparts(&catalog, "part_number,quantity\n100-0001-01,0\n".as_bytes()).unwrap_err();
        assert!(matches!(err, ImportError::InvalidQuantity { row: 2, .. }));

        let err = parse_subparts(&catalog, "part_number,qty\n100-0001-01,1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, ImportError::MissingColumn("quantity")));
    }

    #[test]
    fn test_rows_missing_values_are_skipped() {
        let (catalog, _) = catalog();
        let csv = "part_number,quantity,notes\n100-0001-01,,x\n,4,y\n100-0002-01,4,z\n";
        let plan = parse_subparts(&catalog, csv.as_bytes()).unwrap();
        assert_eq!(plan.skipped, 2);
        assert_eq!(plan.links.len(), 1);
        assert_eq!(plan.links[0].count, 4);
    }

    #[test]
    fn test_export_then_import_reproduces_top_level() {
        let (mut catalog, top) = catalog();
        let sub = catalog.resolve_str("200-0001-01").unwrap();
        let a = catalog.resolve_str("100-0001-01").unwrap();
        let b = catalog.resolve_str("100-0002-01").unwrap();
        catalog.add_subpart(top, sub, 2);
        catalog.add_subpart(top, a, 4);
        catalog.add_subpart(sub, b, 3);
        let before = links(&catalog, top);

        let report = cost_assembly(&catalog, top, 100, &CostOptions::default()).unwrap();
        let mut out = Vec::new();
        write_indented_csv(&report, &catalog, &mut out).unwrap();

        import_subparts(&mut catalog, top, out.as_slice()).unwrap();
        assert_eq!(links(&catalog, top), before);
        // Nested structure is untouched
        assert_eq!(links(&catalog, sub), vec![("100-0002-01".to_string(), 3)]);
    }
}
