//! IndaBOM: indented bill-of-materials costing
//!
//! Parts, assembly structure and sourcing offers are kept as plain YAML
//! files in a project directory. The [`bom`] engines expand an assembly
//! into an indented BOM, pick an offer per line at the build quantity and
//! roll up the cost.

pub mod bom;
pub mod cli;
pub mod core;
pub mod entities;
pub mod yaml;
