//! Recursive indented BOM expansion

use crate::core::catalog::{Catalog, PartId, SubpartLink};
use crate::core::config::DEFAULT_MAX_DEPTH;

use super::BomError;

/// One line of an expanded BOM
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineItem {
    /// Part on this line
    pub part: PartId,

    /// Units of this part per one root assembly (product of counts along the path)
    pub quantity: u64,

    /// Nesting depth, 0 for the root
    pub indent_level: usize,

    /// Link from the parent assembly, `None` for the root
    pub link: Option<SubpartLink>,
}

/// Guards applied while walking the assembly graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpandOptions {
    /// Deepest indent level allowed (`None` = unbounded)
    pub max_depth: Option<usize>,

    /// Fail when a part appears twice on the same root-to-node path
    pub detect_cycles: bool,
}

impl Default for ExpandOptions {
    fn default() -> Self {
        Self {
            max_depth: Some(DEFAULT_MAX_DEPTH),
            detect_cycles: true,
        }
    }
}

/// Expand `root` into a pre-order, indent-leveled line list
///
/// Every occurrence of a shared subassembly is expanded separately since
/// its quantity depends on the path that reaches it. Siblings keep the
/// catalog's link order. With both guards disabled a cyclic graph recurses
/// until the stack is exhausted.
pub fn expand(catalog: &Catalog, root: PartId, options: &ExpandOptions) -> Result<Vec<LineItem>, BomError> {
    let mut lines = Vec::new();
    let mut path = Vec::new();
    visit(catalog, root, 1, 0, None, options, &mut path, &mut lines)?;
    tracing::debug!(
        root = %catalog.part(root).number,
        lines = lines.len(),
        "expanded assembly"
    );
    Ok(lines)
}

#[allow(clippy::too_many_arguments)]
fn visit(
    catalog: &Catalog,
    part: PartId,
    quantity: u64,
    indent_level: usize,
    link: Option<SubpartLink>,
    options: &ExpandOptions,
    path: &mut Vec<PartId>,
    lines: &mut Vec<LineItem>,
) -> Result<(), BomError> {
    if options.detect_cycles && path.contains(&part) {
        let rendered: Vec<String> = path
            .iter()
            .skip_while(|p| **p != part)
            .chain(std::iter::once(&part))
            .map(|p| catalog.part(*p).number.to_string())
            .collect();
        return Err(BomError::Cycle {
            path: rendered.join(" -> "),
        });
    }

    if let Some(max_depth) = options.max_depth {
        if indent_level > max_depth {
            return Err(BomError::TooDeep {
                part: catalog.part(part).number.clone(),
                max_depth,
            });
        }
    }

    lines.push(LineItem {
        part,
        quantity,
        indent_level,
        link,
    });

    let links = catalog.subparts_of(part);
    if links.is_empty() {
        return Ok(());
    }

    path.push(part);
    for l in links {
        let child_quantity = quantity
            .checked_mul(u64::from(l.count))
            .ok_or_else(|| BomError::QuantityOverflow {
                part: catalog.part(l.subpart).number.clone(),
            })?;
        visit(
            catalog,
            l.subpart,
            child_quantity,
            indent_level + 1,
            Some(*l),
            options,
            path,
            lines,
        )?;
    }
    path.pop();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::part::Part;

    fn add(catalog: &mut Catalog, number: &str) -> PartId {
        catalog
            .add_part(Part::new(number.parse().unwrap(), number, "A"))
            .unwrap()
    }

    fn numbers(catalog: &Catalog, lines: &[LineItem]) -> Vec<(String, u64, usize)> {
        lines
            .iter()
            .map(|l| (catalog.part(l.part).number.to_string(), l.quantity, l.indent_level))
            .collect()
    }

    #[test]
    fn test_leaf_part_emits_single_line() {
        let mut catalog = Catalog::new();
        let r = add(&mut catalog, "100-0001-01");

        let lines = expand(&catalog, r, &ExpandOptions::default()).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 1);
        assert_eq!(lines[0].indent_level, 0);
        assert!(lines[0].link.is_none());
    }

    #[test]
    fn test_preorder_with_multiplied_quantities() {
        let mut catalog = Catalog::new();
        let top = add(&mut catalog, "300-0001-01");
        let board = add(&mut catalog, "200-0001-01");
        let res = add(&mut catalog, "100-0001-01");
        let screw = add(&mut catalog, "100-0002-01");

        catalog.add_subpart(top, board, 2);
        catalog.add_subpart(board, res, 5);
        catalog.add_subpart(top, screw, 4);

        let lines = expand(&catalog, top, &ExpandOptions::default()).unwrap();
        assert_eq!(
            numbers(&catalog, &lines),
            vec![
                ("300-0001-01".to_string(), 1, 0),
                ("200-0001-01".to_string(), 2, 1),
                ("100-0001-01".to_string(), 10, 2),
                ("100-0002-01".to_string(), 4, 1),
            ]
        );
        assert_eq!(lines[2].link.unwrap().count, 5);
    }

    #[test]
    fn test_shared_subassembly_expanded_per_path() {
        // top -> a(x2) -> shared(x3) -> leaf(x5)
        // top -> b(x7) -> shared(x1) -> leaf(x5)
        let mut catalog = Catalog::new();
        let top = add(&mut catalog, "400-0001-01");
        let a = add(&mut catalog, "300-0001-01");
        let b = add(&mut catalog, "300-0002-01");
        let shared = add(&mut catalog, "200-0001-01");
        let leaf = add(&mut catalog, "100-0001-01");

        catalog.add_subpart(top, a, 2);
        catalog.add_subpart(top, b, 7);
        catalog.add_subpart(a, shared, 3);
        catalog.add_subpart(b, shared, 1);
        catalog.add_subpart(shared, leaf, 5);

        let lines = expand(&catalog, top, &ExpandOptions::default()).unwrap();
        // One line per root-to-node path: top, a, a/shared, a/shared/leaf, b, b/shared, b/shared/leaf
        assert_eq!(lines.len(), 7);

        let leaf_qty: Vec<u64> = lines
            .iter()
            .filter(|l| l.part == leaf)
            .map(|l| l.quantity)
            .collect();
        assert_eq!(leaf_qty, vec![2 * 3 * 5, 7 * 5]);
    }

    #[test]
    fn test_repeated_links_are_not_merged() {
        let mut catalog = Catalog::new();
        let top = add(&mut catalog, "300-0001-01");
        let res = add(&mut catalog, "100-0001-01");
        catalog.add_subpart(top, res, 1);
        catalog.add_subpart(top, res, 2);

        let lines = expand(&catalog, top, &ExpandOptions::default()).unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].quantity, 1);
        assert_eq!(lines[2].quantity, 2);
    }

    #[test]
    fn test_quantity_overflow_names_the_subpart() {
        // (2^32 - 1)^2 still fits in u64, a third level does not
        let mut catalog = Catalog::new();
        let top = add(&mut catalog, "400-0001-01");
        let a = add(&mut catalog, "300-0001-01");
        let b = add(&mut catalog, "200-0001-01");
        let leaf = add(&mut catalog, "100-0001-01");
        catalog.add_subpart(top, a, u32::MAX);
        catalog.add_subpart(a, b, u32::MAX);
        catalog.add_subpart(b, leaf, u32::MAX);

        match expand(&catalog, top, &ExpandOptions::default()) {
            Err(BomError::QuantityOverflow { part }) => assert_eq!(part.to_string(), "100-0001-01"),
            other => panic!("expected quantity overflow, got {other:?}"),
        }
    }

    #[test]
    fn test_cycle_is_reported() {
        let mut catalog = Catalog::new();
        let a = add(&mut catalog, "300-0001-01");
        let b = add(&mut catalog, "300-0002-01");
        catalog.add_subpart(a, b, 1);
        catalog.add_subpart(b, a, 1);

        let err = expand(&catalog, a, &ExpandOptions::default()).unwrap_err();
        match err {
            BomError::Cycle { path } => {
                assert_eq!(path, "300-0001-01 -> 300-0002-01 -> 300-0001-01")
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_self_link_is_a_cycle() {
        let mut catalog = Catalog::new();
        let a = add(&mut catalog, "300-0001-01");
        catalog.add_subpart(a, a, 1);

        assert!(matches!(
            expand(&catalog, a, &ExpandOptions::default()),
            Err(BomError::Cycle { .. })
        ));
    }

    #[test]
    fn test_depth_guard_without_cycle_detection() {
        let mut catalog = Catalog::new();
        let a = add(&mut catalog, "300-0001-01");
        let b = add(&mut catalog, "300-0002-01");
        catalog.add_subpart(a, b, 1);
        catalog.add_subpart(b, a, 1);

        let options = ExpandOptions {
            max_depth: Some(5),
            detect_cycles: false,
        };
        assert!(matches!(
            expand(&catalog, a, &options),
            Err(BomError::TooDeep { max_depth: 5, .. })
        ));
    }

    #[test]
    fn test_depth_limit_is_inclusive() {
        let mut catalog = Catalog::new();
        let top = add(&mut catalog, "300-0001-01");
        let child = add(&mut catalog, "100-0001-01");
        catalog.add_subpart(top, child, 1);

        let options = ExpandOptions {
            max_depth: Some(1),
            detect_cycles: true,
        };
        assert_eq!(expand(&catalog, top, &options).unwrap().len(), 2);

        let options = ExpandOptions {
            max_depth: Some(0),
            detect_cycles: true,
        };
        assert!(expand(&catalog, top, &options).is_err());
    }
}
