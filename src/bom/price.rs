//! Price-break resolution: pick one offer for a required quantity

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::entities::offer::Offer;

/// Order in which a part's offers are considered
///
/// The selection rule is first-seen-wins on ties, so the enumeration order
/// is part of the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OfferOrder {
    /// Catalog order (offers in the order they were entered)
    Listed,
    /// Stable sort by MOQ, then unit cost with unknown costs last
    #[default]
    MoqAscending,
}

/// The chosen offer for one line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceResolution<'a> {
    pub offer: &'a Offer,

    /// Unit price of the chosen offer; `None` when the offer's cost is unknown
    pub unit_price: Option<Decimal>,

    /// Quantity to order: the required quantity, raised to the offer's MOQ if needed
    pub order_quantity: u64,
}

/// Choose the offer to buy `required_quantity` units from
///
/// Walking the offers in `order`:
/// - an offer whose MOQ is below the required quantity is taken if nothing
///   is chosen yet or it is strictly cheaper than the current choice;
/// - otherwise, if nothing is chosen yet, the offer is taken anyway and the
///   order quantity is raised to its MOQ when that exceeds the requirement.
///
/// An offer whose MOQ is at or above the required quantity is therefore
/// only reachable when it is the first one seen. Unknown costs never beat known ones. Returns
/// `None` only when there are no offers at all.
pub fn resolve_price(offers: &[Offer], required_quantity: u64, order: OfferOrder) -> Option<PriceResolution<'_>> {
    let mut ordered: Vec<&Offer> = offers.iter().collect();
    if order == OfferOrder::MoqAscending {
        ordered.sort_by(|a, b| {
            a.moq()
                .cmp(&b.moq())
                .then_with(|| cmp_cost(a.unit_cost, b.unit_cost))
        });
    }

    let mut best: Option<PriceResolution<'_>> = None;
    for offer in ordered {
        let below_moq = offer.moq() < required_quantity;
        if below_moq && best.as_ref().map_or(true, |b| is_cheaper(offer.unit_cost, b.unit_price)) {
            best = Some(PriceResolution {
                offer,
                unit_price: offer.unit_cost,
                order_quantity: required_quantity,
            });
        } else if best.is_none() {
            best = Some(PriceResolution {
                offer,
                unit_price: offer.unit_cost,
                order_quantity: required_quantity.max(offer.moq()),
            });
        }
    }

    best
}

fn is_cheaper(candidate: Option<Decimal>, current: Option<Decimal>) -> bool {
    match (candidate, current) {
        (Some(c), Some(b)) => c < b,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

fn cmp_cost(a: Option<Decimal>, b: Option<Decimal>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
