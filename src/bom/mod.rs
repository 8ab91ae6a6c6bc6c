//! Indented BOM engines
//!
//! The cost pipeline runs in three stages over a loaded [`Catalog`]:
//!
//! 1. [`expand`] walks the assembly tree from a root part and emits one
//!    indent-leveled [`LineItem`] per root-to-node path.
//! 2. [`price::resolve_price`] picks one offer per line at the line's
//!    extended quantity.
//! 3. [`rollup::rollup`] extends and totals the priced lines, tracking
//!    whether every line had an offer.
//!
//! [`cost::cost_assembly`] chains the three. The tabular [`export`] and
//! [`import`] formats and offer [`matching`] sit on top.
//!
//! [`Catalog`]: crate::core::catalog::Catalog
//! [`expand`]: expand::expand
//! [`LineItem`]: expand::LineItem

pub mod cost;
mod csv_common;
pub mod expand;
pub mod export;
pub mod import;
pub mod matching;
pub mod price;
pub mod rollup;

use miette::Diagnostic;
use thiserror::Error;

use crate::core::catalog::CatalogError;
use crate::core::identity::PartNumber;

pub use cost::{cost_assembly, CostOptions, CostReport};
pub use expand::{expand, ExpandOptions, LineItem};
pub use price::{resolve_price, OfferOrder, PriceResolution};
pub use rollup::{rollup, PricedLine, RolledLine, Rollup};

/// Errors raised while expanding or costing an assembly
#[derive(Debug, Error, Diagnostic)]
pub enum BomError {
    #[error("assembly cycle detected: {path}")]
    #[diagnostic(
        code(indabom::bom::cycle),
        help("an assembly cannot contain itself; remove one of the links on this path")
    )]
    Cycle { path: String },

    #[error("assembly nesting under {part} exceeds the maximum depth of {max_depth}")]
    #[diagnostic(
        code(indabom::bom::too_deep),
        help("raise max_depth in .indabom/config.yaml or pass --max-depth if the structure is intended")
    )]
    TooDeep { part: PartNumber, max_depth: usize },

    #[error("quantity overflow while extending {part}")]
    #[diagnostic(code(indabom::bom::overflow))]
    QuantityOverflow { part: PartNumber },

    /// Raised by [`rollup::rollup`], which only sees line positions
    #[error("arithmetic overflow while extending BOM line {line}")]
    #[diagnostic(code(indabom::bom::line_overflow))]
    LineOverflow { line: usize },

    #[error("cost overflow while extending {part}")]
    #[diagnostic(
        code(indabom::bom::cost_overflow),
        help("check the unit cost of this part's offers and the build quantity")
    )]
    CostOverflow { part: PartNumber },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Catalog(#[from] CatalogError),
}
