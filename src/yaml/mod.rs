//! YAML loading with source-annotated errors

pub mod diagnostics;

use serde::de::DeserializeOwned;
use std::path::Path;

pub use diagnostics::{YamlError, YamlSyntaxError};

/// Parse a YAML string, reporting failures against `filename`
pub fn parse_yaml_str<T: DeserializeOwned>(source: &str, filename: &str) -> Result<T, YamlError> {
    serde_yml::from_str(source)
        .map_err(|e| YamlSyntaxError::from_serde_error(&e, source, filename).into())
}

/// Read and parse a YAML file
pub fn parse_yaml_file<T: DeserializeOwned>(path: &Path) -> Result<T, YamlError> {
    let source = std::fs::read_to_string(path)?;
    parse_yaml_str(&source, &path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::part::Part;

    #[test]
    fn test_parse_valid_part() {
        let yaml = "number: 100-0001-01\ndescription: Resistor\nrevision: A\ncreated: 2024-01-01T00:00:00Z\n";
        let part: Part = parse_yaml_str(yaml, "100-0001-01.yaml").unwrap();
        assert_eq!(part.number.to_string(), "100-0001-01");
    }

    #[test]
    fn test_parse_bad_part_number_reports_help() {
        let yaml = "number: 100-1-01\ndescription: Resistor\ncreated: 2024-01-01T00:00:00Z\n";
        let err = parse_yaml_str::<Part>(yaml, "bad.yaml").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("YAML syntax error"));
        assert!(msg.contains("invalid item number"));
    }

    #[test]
    fn test_parse_missing_file_is_io_error() {
        let err = parse_yaml_file::<Part>(Path::new("/nonexistent/part.yaml")).unwrap_err();
        assert!(matches!(err, YamlError::Io(_)));
    }
}
