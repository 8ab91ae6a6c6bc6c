//! Part entity - a catalog item, optionally an assembly of other parts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::PartNumber;

/// Stored subpart link: `count` of `part` per one unit of the owning assembly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubpartRef {
    /// Subpart number
    pub part: PartNumber,

    /// Quantity of the subpart per assembly
    #[serde(default = "default_count")]
    pub count: u32,
}

fn default_count() -> u32 {
    1
}

/// Explicit organization context for operations that fill in defaults
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgContext {
    /// Organization name, used as the manufacturer of in-house parts
    pub name: String,
}

impl OrgContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A Part entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    /// Composite part number (unique key)
    pub number: PartNumber,

    /// Short description
    pub description: String,

    /// Part revision
    #[serde(default)]
    pub revision: String,

    /// Manufacturer name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,

    /// Manufacturer's own part number
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub manufacturer_part_number: String,

    /// Subpart links, in assembly order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subparts: Vec<SubpartRef>,

    /// Creation timestamp
    pub created: DateTime<Utc>,
}

impl Entity for Part {
    const KIND: &'static str = "part";
    const DIRECTORY: &'static str = "parts";

    fn key(&self) -> String {
        self.number.to_string()
    }
}

impl Part {
    /// Create a new part with no subparts
    pub fn new(number: PartNumber, description: impl Into<String>, revision: impl Into<String>) -> Self {
        Self {
            number,
            description: description.into(),
            revision: revision.into(),
            manufacturer: None,
            manufacturer_part_number: String::new(),
            subparts: Vec::new(),
            created: Utc::now(),
        }
    }

    /// Whether this part is an assembly (has at least one subpart link)
    pub fn is_assembly(&self) -> bool {
        !self.subparts.is_empty()
    }

    /// Fill in manufacturer details for in-house parts
    ///
    /// A part with neither a manufacturer nor a manufacturer part number is
    /// made by the organization itself: its MPN becomes its own part number.
    pub fn apply_org_defaults(&mut self, org: &OrgContext) {
        if self.manufacturer.is_none() && self.manufacturer_part_number.is_empty() {
            self.manufacturer_part_number = self.number.to_string();
            self.manufacturer = Some(org.name.clone());
        }
    }
}
