//! Expand, price and roll up an assembly in one pass

use crate::core::catalog::{Catalog, PartId};

use super::expand::{expand, ExpandOptions};
use super::price::{resolve_price, OfferOrder};
use super::rollup::{rollup, PricedLine, Rollup};
use super::BomError;

/// Knobs for [`cost_assembly`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CostOptions {
    pub expand: ExpandOptions,
    pub offer_order: OfferOrder,
}

/// Result of costing one assembly at a build quantity
#[derive(Debug, Clone, PartialEq)]
pub struct CostReport {
    pub root: PartId,
    pub build_quantity: u64,
    pub rollup: Rollup,
}

impl CostReport {
    pub fn is_complete(&self) -> bool {
        self.rollup.is_complete
    }
}

/// Cost `build_quantity` units of `root`
///
/// Every line is priced at its extended quantity, so price breaks apply
/// to the whole build rather than to a single assembly. The root itself is
/// the first line and is priced like any other part.
pub fn cost_assembly(
    catalog: &Catalog,
    root: PartId,
    build_quantity: u64,
    options: &CostOptions,
) -> Result<CostReport, BomError> {
    let items = expand(catalog, root, &options.expand)?;

    let mut priced = Vec::with_capacity(items.len());
    for item in items {
        let part = catalog.part(item.part);
        let required = build_quantity
            .checked_mul(item.quantity)
            .ok_or_else(|| BomError::QuantityOverflow {
                part: part.number.clone(),
            })?;

        let line = match resolve_price(catalog.offers_for(item.part), required, options.offer_order) {
            Some(res) => {
                tracing::debug!(
                    part = %part.number,
                    seller = %res.offer.seller,
                    required,
                    order_quantity = res.order_quantity,
                    "resolved offer"
                );
                if res.unit_price.is_none() {
                    tracing::debug!(part = %part.number, seller = %res.offer.seller, "chosen offer has no unit cost");
                }
                PricedLine {
                    item,
                    offer: Some(res.offer.clone()),
                    unit_price: res.unit_price,
                    order_quantity: Some(res.order_quantity),
                }
            }
            None => {
                tracing::debug!(part = %part.number, "no offers, line left unpriced");
                PricedLine {
                    item,
                    offer: None,
                    unit_price: None,
                    order_quantity: None,
                }
            }
        };
        priced.push(line);
    }

    let parts: Vec<PartId> = priced.iter().map(|l| l.item.part).collect();
    let rollup = rollup(priced, build_quantity).map_err(|e| match e {
        BomError::LineOverflow { line } => match line.checked_sub(1).and_then(|i| parts.get(i)) {
            Some(&part) => BomError::CostOverflow {
                part: catalog.part(part).number.clone(),
            },
            None => e,
        },
        other => other,
    })?;

    Ok(CostReport {
        root,
        build_quantity,
        rollup,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::offer::Offer;
    use crate::entities::part::Part;
    use rust_decimal::Decimal;

    fn add(catalog: &mut Catalog, number: &str) -> PartId {
        catalog
            .add_part(Part::new(number.parse().unwrap(), number, "A"))
            .unwrap()
    }

    fn offer(catalog: &mut Catalog, number: &str, seller: &str, moq: u64, cents: i64) {
        let o = Offer::new(number.parse().unwrap(), seller)
            .with_moq(moq)
            .with_unit_cost(Decimal::new(cents, 2));
        assert!(catalog.insert_offer_if_absent(o).unwrap());
    }

    #[test]
    fn test_cost_two_level_assembly() {
        let mut catalog = Catalog::new();
        let top = add(&mut catalog, "300-0001-01");
        let res = add(&mut catalog, "100-0001-01");
        let cap = add(&mut catalog, "100-0002-01");
        catalog.add_subpart(top, res, 2);
        catalog.add_subpart(top, cap, 1);

        offer(&mut catalog, "100-0001-01", "Digi-Key", 1, 300);
        offer(&mut catalog, "100-0001-01", "Mouser", 1000, 100);

        let report = cost_assembly(&catalog, top, 100, &CostOptions::default()).unwrap();
        let lines = &report.rollup.lines;
        assert_eq!(lines.len(), 3);

        // Root and capacitor have no offers
        assert!(lines[0].offer.is_none());
        assert!(lines[2].offer.is_none());

        // 200 required: Mouser's MOQ 1000 is not reachable past Digi-Key
        let chosen = lines[1].offer.as_ref().unwrap();
        assert_eq!(chosen.seller, "Digi-Key");
        assert_eq!(lines[1].order_quantity, Some(200));
        assert_eq!(lines[1].extended_quantity, 200);

        assert_eq!(report.rollup.unit_cost_total, Decimal::new(600, 2));
        assert_eq!(report.rollup.extended_cost_total, Decimal::new(60000, 2));
        assert!(!report.is_complete());
    }

    #[test]
    fn test_price_breaks_use_build_quantity() {
        let mut catalog = Catalog::new();
        let top = add(&mut catalog, "300-0001-01");
        let res = add(&mut catalog, "100-0001-01");
        catalog.add_subpart(top, res, 10);
        offer(&mut catalog, "300-0001-01", "Fab", 0, 5000);
        offer(&mut catalog, "100-0001-01", "Reel", 500, 1);
        offer(&mut catalog, "100-0001-01", "Cut tape", 1, 10);

        // 100 builds need 1000 resistors: the reel break applies
        let report = cost_assembly(&catalog, top, 100, &CostOptions::default()).unwrap();
        assert!(report.is_complete());
        assert_eq!(report.rollup.lines[1].offer.as_ref().unwrap().seller, "Reel");

        // 10 builds need 100: only cut tape is below its MOQ
        let report = cost_assembly(&catalog, top, 10, &CostOptions::default()).unwrap();
        assert_eq!(report.rollup.lines[1].offer.as_ref().unwrap().seller, "Cut tape");
        assert_eq!(report.rollup.unit_cost_total, Decimal::new(5100, 2));
    }

    #[test]
    fn test_huge_unit_cost_is_an_error() {
        let mut catalog = Catalog::new();
        let top = add(&mut catalog, "300-0001-01");
        let res = add(&mut catalog, "100-0001-01");
        catalog.add_subpart(top, res, 2);
        let o = Offer::new("100-0001-01".parse().unwrap(), "Broker").with_unit_cost(Decimal::MAX);
        assert!(catalog.insert_offer_if_absent(o).unwrap());

        match cost_assembly(&catalog, top, 1, &CostOptions::default()) {
            Err(BomError::CostOverflow { part }) => assert_eq!(part.to_string(), "100-0001-01"),
            other => panic!("expected cost overflow, got {other:?}"),
        }
    }

    #[test]
    fn test_build_quantity_overflow_is_an_error() {
        let mut catalog = Catalog::new();
        let top = add(&mut catalog, "300-0001-01");
        let res = add(&mut catalog, "100-0001-01");
        catalog.add_subpart(top, res, 2);

        // The root line (quantity 1) fits; the resistor line does not
        match cost_assembly(&catalog, top, u64::MAX, &CostOptions::default()) {
            Err(BomError::QuantityOverflow { part }) => assert_eq!(part.to_string(), "100-0001-01"),
            other => panic!("expected quantity overflow, got {other:?}"),
        }
    }

    #[test]
    fn test_cycle_surfaces_as_error() {
        let mut catalog = Catalog::new();
        let a = add(&mut catalog, "300-0001-01");
        let b = add(&mut catalog, "300-0002-01");
        catalog.add_subpart(a, b, 1);
        catalog.add_subpart(b, a, 1);

        assert!(matches!(
            cost_assembly(&catalog, a, 1, &CostOptions::default()),
            Err(BomError::Cycle { .. })
        ));
    }
}
