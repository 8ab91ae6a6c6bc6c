//! Header lookup shared by the CSV readers

use csv::StringRecord;
use std::collections::HashMap;

/// Map lowercased, trimmed header names to column indexes
pub(crate) fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim().to_lowercase(), i))
        .collect()
}

/// Trimmed value of a named column, `None` when absent or blank
pub(crate) fn get_field<'r>(record: &'r StringRecord, header_map: &HashMap<String, usize>, field: &str) -> Option<&'r str> {
    header_map
        .get(field)
        .and_then(|&idx| record.get(idx))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_are_case_insensitive() {
        let headers = StringRecord::from(vec![" Part_Number ", "QUANTITY", "notes"]);
        let map = build_header_map(&headers);
        assert_eq!(map.get("part_number"), Some(&0));
        assert_eq!(map.get("quantity"), Some(&1));
    }

    #[test]
    fn test_blank_and_missing_fields_are_none() {
        let map = build_header_map(&StringRecord::from(vec!["part_number", "quantity", "notes"]));
        let record = StringRecord::from(vec![" 100-0001-01 ", "  "]);
        assert_eq!(get_field(&record, &map, "part_number"), Some("100-0001-01"));
        assert_eq!(get_field(&record, &map, "quantity"), None);
        assert_eq!(get_field(&record, &map, "notes"), None);
        assert_eq!(get_field(&record, &map, "level"), None);
    }
}
