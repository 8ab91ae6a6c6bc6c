//! Offer entity - a purchasable sourcing option for a part

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{OfferId, PartNumber};

/// Where an offer comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OfferSource {
    /// Catalog distributor (e.g. found by part matching)
    #[default]
    Distributor,
    /// Direct seller / contract manufacturer
    Seller,
}

impl std::fmt::Display for OfferSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OfferSource::Distributor => write!(f, "distributor"),
            OfferSource::Seller => write!(f, "seller"),
        }
    }
}

impl std::str::FromStr for OfferSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "distributor" => Ok(OfferSource::Distributor),
            "seller" => Ok(OfferSource::Seller),
            _ => Err(format!(
                "Invalid offer source: {}. Use 'distributor' or 'seller'",
                s
            )),
        }
    }
}

/// An Offer entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    /// Unique identifier (OFR-...)
    pub id: OfferId,

    /// Part this offer sells
    pub part: PartNumber,

    /// Distributor or seller name
    pub seller: String,

    /// Distributor or seller
    #[serde(default)]
    pub source: OfferSource,

    /// Minimum order quantity (none = no minimum)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_order_quantity: Option<u64>,

    /// Pack size the seller ships in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_pack_quantity: Option<u64>,

    /// Unit cost (none = unknown)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_cost: Option<Decimal>,

    /// Lead time in days
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_time_days: Option<u32>,

    /// One-off engineering cost
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nre_cost: Option<Decimal>,

    /// Non-cancellable / non-returnable
    #[serde(default)]
    pub ncnr: bool,

    /// Creation timestamp
    pub created: DateTime<Utc>,
}

impl Entity for Offer {
    const KIND: &'static str = "offer";
    const DIRECTORY: &'static str = "offers";

    fn key(&self) -> String {
        self.id.to_string()
    }
}

impl Offer {
    /// Create a new offer with unknown MOQ and cost
    pub fn new(part: PartNumber, seller: impl Into<String>) -> Self {
        Self {
            id: OfferId::new(),
            part,
            seller: seller.into(),
            source: OfferSource::default(),
            minimum_order_quantity: None,
            minimum_pack_quantity: None,
            unit_cost: None,
            lead_time_days: None,
            nre_cost: None,
            ncnr: false,
            created: Utc::now(),
        }
    }

    /// Builder-style MOQ setter
    pub fn with_moq(mut self, moq: u64) -> Self {
        self.minimum_order_quantity = Some(moq);
        self
    }

    /// Builder-style unit cost setter
    pub fn with_unit_cost(mut self, cost: Decimal) -> Self {
        self.unit_cost = Some(cost);
        self
    }

    /// Minimum order quantity, with "no minimum" as zero
    pub fn moq(&self) -> u64 {
        self.minimum_order_quantity.unwrap_or(0)
    }

    /// Whether two offers describe the same (seller, part, moq, unit cost)
    pub fn is_duplicate_of(&self, other: &Offer) -> bool {
        self.seller == other.seller
            && self.part == other.part
            && self.minimum_order_quantity == other.minimum_order_quantity
            && self.unit_cost == other.unit_cost
    }
}
