//! Identity types: composite part numbers and ULID-based offer IDs

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, OnceLock};
use thiserror::Error;
use ulid::{Generator, Ulid};

/// Maximum length of a part class code (e.g. "100", "PCB")
pub const MAX_CLASS_CODE_LEN: usize = 3;

/// Composite part number: `{class_code}-{item:04}-{variation:02}`
///
/// The triple is the stable key of a part. Ordering follows the triple
/// field by field, which is also the order parts are listed and exported in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartNumber {
    class_code: String,
    item: u16,
    variation: u8,
}

impl PartNumber {
    /// Create a part number from its parts, validating each field
    pub fn new(class_code: impl Into<String>, item: u16, variation: u8) -> Result<Self, PartNumberError> {
        let class_code = class_code.into();
        validate_class_code(&class_code)?;
        if item > 9999 {
            return Err(PartNumberError::InvalidItem(item.to_string()));
        }
        if variation > 99 {
            return Err(PartNumberError::InvalidVariation(variation.to_string()));
        }
        Ok(Self {
            class_code,
            item,
            variation,
        })
    }

    /// The class code (first field)
    pub fn class_code(&self) -> &str {
        &self.class_code
    }

    /// The item number (second field)
    pub fn item(&self) -> u16 {
        self.item
    }

    /// The variation (third field)
    pub fn variation(&self) -> u8 {
        self.variation
    }

    /// Parse a part number from a string
    pub fn parse(s: &str) -> Result<Self, PartNumberError> {
        s.parse()
    }
}

fn validate_class_code(code: &str) -> Result<(), PartNumberError> {
    if code.is_empty()
        || code.len() > MAX_CLASS_CODE_LEN
        || !code.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err(PartNumberError::InvalidClassCode(code.to_string()));
    }
    Ok(())
}

fn parse_fixed_digits(field: &str, width: usize) -> Option<u16> {
    if field.len() != width || !field.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

impl fmt::Display for PartNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:04}-{:02}", self.class_code, self.item, self.variation)
    }
}

impl FromStr for PartNumber {
    type Err = PartNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split('-').collect();
        if fields.len() != 3 {
            return Err(PartNumberError::InvalidFormat(s.to_string()));
        }

        validate_class_code(fields[0])?;
        let item = parse_fixed_digits(fields[1], 4)
            .ok_or_else(|| PartNumberError::InvalidItem(fields[1].to_string()))?;
        let variation = parse_fixed_digits(fields[2], 2)
            .ok_or_else(|| PartNumberError::InvalidVariation(fields[2].to_string()))?;

        Ok(Self {
            class_code: fields[0].to_string(),
            item,
            variation: variation as u8,
        })
    }
}

impl Serialize for PartNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PartNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors that can occur when parsing a part number
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PartNumberError {
    #[error("invalid part number '{0}': expected CLASS-NNNN-NN (e.g. 100-0001-01)")]
    InvalidFormat(String),

    #[error("invalid class code '{0}': expected 1 to 3 letters or digits")]
    InvalidClassCode(String),

    #[error("invalid item number '{0}': expected exactly 4 digits")]
    InvalidItem(String),

    #[error("invalid variation '{0}': expected exactly 2 digits")]
    InvalidVariation(String),
}

/// Prefix used when rendering offer IDs
pub const OFFER_PREFIX: &str = "OFR";

/// Unique identifier of a sourcing offer (`OFR-<ULID>`)
///
/// IDs come from a monotonic generator, so two offers created in the same
/// millisecond still compare in creation order. Ordering offers by ID gives
/// the stable "as entered" enumeration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OfferId(Ulid);

impl OfferId {
    /// Generate a fresh offer ID, strictly greater than any generated before
    pub fn new() -> Self {
        static GENERATOR: OnceLock<Mutex<Generator>> = OnceLock::new();
        let mut generator = GENERATOR
            .get_or_init(|| Mutex::new(Generator::new()))
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // Only fails once 2^80 IDs share a millisecond
        Self(generator.generate().unwrap_or_else(|_| Ulid::new()))
    }

    /// Get the ULID component
    pub fn ulid(&self) -> Ulid {
        self.0
    }
}

impl Default for OfferId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OfferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", OFFER_PREFIX, self.0)
    }
}

impl FromStr for OfferId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, ulid_str) = s
            .split_once('-')
            .ok_or_else(|| IdParseError::InvalidFormat(s.to_string()))?;

        if !prefix.eq_ignore_ascii_case(OFFER_PREFIX) {
            return Err(IdParseError::InvalidPrefix(prefix.to_string()));
        }

        let ulid = Ulid::from_string(ulid_str)
            .map_err(|e| IdParseError::InvalidUlid(e.to_string()))?;

        Ok(Self(ulid))
    }
}

impl Serialize for OfferId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for OfferId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors that can occur when parsing an offer ID
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdParseError {
    #[error("invalid ID format: {0} (expected OFR-<ULID>)")]
    InvalidFormat(String),

    #[error("invalid ID prefix: {0}")]
    InvalidPrefix(String),

    #[error("invalid ULID: {0}")]
    InvalidUlid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_number_display_pads_fields() {
        let pn = PartNumber::new("100", 1, 1).unwrap();
        assert_eq!(pn.to_string(), "100-0001-01");
    }

    #[test]
    fn test_part_number_parse() {
        let pn: PartNumber = "200-0042-07".parse().unwrap();
        assert_eq!(pn.class_code(), "200");
        assert_eq!(pn.item(), 42);
        assert_eq!(pn.variation(), 7);
    }

    #[test]
    fn test_part_number_roundtrip() {
        let original = "PCB-1234-99";
        let pn = PartNumber::parse(original).unwrap();
        assert_eq!(pn.to_string(), original);
    }

    #[test]
    fn test_part_number_rejects_malformed() {
        assert!(matches!(
            PartNumber::parse("100-0001"),
            Err(PartNumberError::InvalidFormat(_))
        ));
        assert!(matches!(
            PartNumber::parse("100-001-01"),
            Err(PartNumberError::InvalidItem(_))
        ));
        assert!(matches!(
            PartNumber::parse("100-0001-1"),
            Err(PartNumberError::InvalidVariation(_))
        ));
        assert!(matches!(
            PartNumber::parse("1000-0001-01"),
            Err(PartNumberError::InvalidClassCode(_))
        ));
        assert!(matches!(
            PartNumber::parse("-0001-01"),
            Err(PartNumberError::InvalidClassCode(_))
        ));
        assert!(PartNumber::parse("100-00a1-01").is_err());
        assert!(PartNumber::parse("100-0001-01-02").is_err());
        assert!(PartNumber::parse("").is_err());
    }

    #[test]
    fn test_part_number_new_validates() {
        assert!(PartNumber::new("10!", 1, 1).is_err());
        assert!(PartNumber::new("100", 10000, 1).is_err());
        assert!(PartNumber::new("100", 1, 100).is_err());
    }

    #[test]
    fn test_part_number_ordering() {
        let mut pns: Vec<PartNumber> = ["200-0001-01", "100-0002-01", "100-0001-02", "100-0001-01"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        pns.sort();
        let rendered: Vec<String> = pns.iter().map(|p| p.to_string()).collect();
        assert_eq!(
            rendered,
            vec!["100-0001-01", "100-0001-02", "100-0002-01", "200-0001-01"]
        );
    }

    #[test]
    fn test_part_number_serde_as_string() {
        let pn = PartNumber::parse("100-0001-01").unwrap();
        let json = serde_json::to_string(&pn).unwrap();
        assert_eq!(json, "\"100-0001-01\"");
        let parsed: PartNumber = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, pn);
        assert!(serde_json::from_str::<PartNumber>("\"bogus\"").is_err());
    }

    #[test]
    fn test_offer_ids_increase_within_a_millisecond() {
        let ids: Vec<OfferId> = (0..1000).map(|_| OfferId::new()).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_offer_id_roundtrip() {
        let id = OfferId::new();
        let s = id.to_string();
        assert!(s.starts_with("OFR-"));
        let parsed: OfferId = s.parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_offer_id_invalid() {
        assert!("OFR".parse::<OfferId>().is_err());
        assert!(matches!(
            "REQ-01J123456789ABCDEFGHJKMNPQ".parse::<OfferId>(),
            Err(IdParseError::InvalidPrefix(_))
        ));
        assert!(matches!(
            "OFR-notaulid".parse::<OfferId>(),
            Err(IdParseError::InvalidUlid(_))
        ));
    }
}
