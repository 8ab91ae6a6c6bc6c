//! Cost rollup over priced BOM lines

use rust_decimal::Decimal;

use crate::entities::offer::Offer;

use super::expand::LineItem;
use super::BomError;

/// An expanded line annotated with its chosen offer
#[derive(Debug, Clone, PartialEq)]
pub struct PricedLine {
    pub item: LineItem,

    /// Chosen offer, `None` when the part has no offers
    pub offer: Option<Offer>,

    /// `None` when there is no offer or the offer's cost is unknown
    pub unit_price: Option<Decimal>,

    /// Quantity to order for the whole build, `None` without an offer
    pub order_quantity: Option<u64>,
}

/// A priced line extended by the build quantity
#[derive(Debug, Clone, PartialEq)]
pub struct RolledLine {
    pub item: LineItem,
    pub offer: Option<Offer>,
    pub unit_price: Option<Decimal>,
    pub order_quantity: Option<u64>,

    /// `build_quantity × item.quantity`
    pub extended_quantity: u64,

    /// `extended_quantity × unit_price`, `None` when unpriced
    pub extended_cost: Option<Decimal>,
}

impl RolledLine {
    pub fn is_priced(&self) -> bool {
        self.unit_price.is_some()
    }
}

/// Totals for one costed build
#[derive(Debug, Clone, PartialEq)]
pub struct Rollup {
    pub lines: Vec<RolledLine>,

    /// Cost of one root assembly; unpriced lines contribute zero
    pub unit_cost_total: Decimal,

    /// `unit_cost_total × build_quantity`
    pub extended_cost_total: Decimal,

    /// False when at least one line has no offer at all
    pub is_complete: bool,
}

impl Rollup {
    /// Lines without a known unit price, offered or not
    pub fn unpriced(&self) -> impl Iterator<Item = &RolledLine> {
        self.lines.iter().filter(|l| !l.is_priced())
    }

    /// Lines with no offer, the ones that make a rollup incomplete
    pub fn unsourced(&self) -> impl Iterator<Item = &RolledLine> {
        self.lines.iter().filter(|l| l.offer.is_none())
    }
}

/// Extend and total the priced lines
///
/// A missing price never fails the rollup: the line keeps a `None` extended
/// cost and counts as zero in the totals. Only a line with no offer clears
/// `is_complete`. Arithmetic overflow is reported as
/// [`BomError::LineOverflow`] with the 1-based line position.
pub fn rollup(lines: Vec<PricedLine>, build_quantity: u64) -> Result<Rollup, BomError> {
    let mut unit_cost_total = Decimal::ZERO;
    let mut extended_cost_total = Decimal::ZERO;
    let mut is_complete = true;

    let mut rolled = Vec::with_capacity(lines.len());
    for (index, line) in lines.into_iter().enumerate() {
        let overflow = || BomError::LineOverflow { line: index + 1 };

        let extended_quantity = build_quantity
            .checked_mul(line.item.quantity)
            .ok_or_else(overflow)?;

        let extended_cost = match line.unit_price {
            Some(price) => {
                let per_unit = price
                    .checked_mul(Decimal::from(line.item.quantity))
                    .ok_or_else(overflow)?;
                unit_cost_total = unit_cost_total.checked_add(per_unit).ok_or_else(overflow)?;

                let extended = price
                    .checked_mul(Decimal::from(extended_quantity))
                    .ok_or_else(overflow)?;
                extended_cost_total = extended_cost_total
                    .checked_add(extended)
                    .ok_or_else(overflow)?;
                Some(extended)
            }
            None => None,
        };

        if line.offer.is_none() {
            is_complete = false;
        }

        rolled.push(RolledLine {
            item: line.item,
            offer: line.offer,
            unit_price: line.unit_price,
            order_quantity: line.order_quantity,
            extended_quantity,
            extended_cost,
        });
    }

    Ok(Rollup {
        lines: rolled,
        unit_cost_total,
        extended_cost_total,
        is_complete,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::Catalog;
    use crate::entities::part::Part;

    fn line(catalog: &mut Catalog, number: &str, quantity: u64, price: Option<Decimal>) -> PricedLine {
        let part = catalog
            .add_part(Part::new(number.parse().unwrap(), number, "A"))
            .unwrap();
        PricedLine {
            item: LineItem {
                part,
                quantity,
                indent_level: 1,
                link: None,
            },
            offer: None,
            unit_price: price,
            order_quantity: None,
        }
    }

    fn offered(catalog: &mut Catalog, number: &str, quantity: u64, price: Option<Decimal>) -> PricedLine {
        let mut offer = Offer::new(number.parse().unwrap(), "Digi-Key");
        if let Some(price) = price {
            offer = offer.with_unit_cost(price);
        }
        PricedLine {
            offer: Some(offer),
            ..line(catalog, number, quantity, price)
        }
    }

    #[test]
    fn test_partial_rollup_keeps_known_totals() {
        let mut catalog = Catalog::new();
        let a = offered(&mut catalog, "100-0001-01", 2, Some(Decimal::new(300, 2)));
        let b = line(&mut catalog, "100-0002-01", 1, None);

        let result = rollup(vec![a, b], 100).unwrap();
        assert_eq!(result.unit_cost_total, Decimal::new(600, 2));
        assert_eq!(result.extended_cost_total, Decimal::new(60000, 2));
        assert!(!result.is_complete);

        assert_eq!(result.lines[0].extended_quantity, 200);
        assert_eq!(result.lines[0].extended_cost, Some(Decimal::new(60000, 2)));
        assert_eq!(result.lines[1].extended_quantity, 100);
        assert_eq!(result.lines[1].extended_cost, None);
        assert_eq!(result.unpriced().count(), 1);
        assert_eq!(result.unsourced().count(), 1);
    }

    #[test]
    fn test_fully_offered_rollup_is_complete() {
        let mut catalog = Catalog::new();
        let a = offered(&mut catalog, "100-0001-01", 4, Some(Decimal::new(25, 2)));
        let b = offered(&mut catalog, "100-0002-01", 1, Some(Decimal::new(1, 0)));

        let result = rollup(vec![a, b], 10).unwrap();
        assert!(result.is_complete);
        assert_eq!(result.unit_cost_total, Decimal::new(2, 0));
        assert_eq!(result.extended_cost_total, Decimal::new(20, 0));
    }

    #[test]
    fn test_offer_without_cost_stays_complete() {
        let mut catalog = Catalog::new();
        let a = offered(&mut catalog, "100-0001-01", 2, Some(Decimal::new(150, 2)));
        let b = offered(&mut catalog, "100-0002-01", 3, None);

        let result = rollup(vec![a, b], 5).unwrap();
        assert!(result.is_complete);
        assert_eq!(result.lines[1].extended_cost, None);
        assert_eq!(result.unpriced().count(), 1);
        assert_eq!(result.unsourced().count(), 0);
        assert_eq!(result.unit_cost_total, Decimal::new(300, 2));
        assert_eq!(result.extended_cost_total, Decimal::new(1500, 2));
    }

    #[test]
    fn test_priced_line_without_offer_is_incomplete() {
        let mut catalog = Catalog::new();
        let a = line(&mut catalog, "100-0001-01", 1, Some(Decimal::ONE));

        let result = rollup(vec![a], 1).unwrap();
        assert!(!result.is_complete);
        assert_eq!(result.unpriced().count(), 0);
        assert_eq!(result.unit_cost_total, Decimal::ONE);
    }

    #[test]
    fn test_cost_overflow_is_an_error() {
        let mut catalog = Catalog::new();
        let a = offered(&mut catalog, "100-0001-01", 1, Some(Decimal::new(1, 0)));
        let b = offered(&mut catalog, "100-0002-01", 2, Some(Decimal::MAX));

        assert!(matches!(
            rollup(vec![a, b], 1),
            Err(BomError::LineOverflow { line: 2 })
        ));
    }

    #[test]
    fn test_total_overflow_is_an_error() {
        let mut catalog = Catalog::new();
        let a = offered(&mut catalog, "100-0001-01", 1, Some(Decimal::MAX));
        let b = offered(&mut catalog, "100-0002-01", 1, Some(Decimal::MAX));

        assert!(matches!(
            rollup(vec![a, b], 1),
            Err(BomError::LineOverflow { line: 2 })
        ));
    }

    #[test]
    fn test_quantity_overflow_is_an_error() {
        let mut catalog = Catalog::new();
        let a = line(&mut catalog, "100-0001-01", 3, None);

        assert!(matches!(
            rollup(vec![a], u64::MAX),
            Err(BomError::LineOverflow { line: 1 })
        ));
    }

    #[test]
    fn test_empty_rollup() {
        let result = rollup(Vec::new(), 100).unwrap();
        assert!(result.is_complete);
        assert_eq!(result.unit_cost_total, Decimal::ZERO);
        assert!(result.lines.is_empty());
    }
}
