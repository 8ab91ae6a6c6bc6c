//! Core module - identity, project store and the in-memory catalog

pub mod catalog;
pub mod config;
pub mod entity;
pub mod identity;
pub mod loader;
pub mod project;

pub use catalog::{Catalog, CatalogError, PartId, SubpartLink};
pub use config::Config;
pub use entity::Entity;
pub use identity::{IdParseError, OfferId, PartNumber, PartNumberError};
pub use project::{Project, ProjectError};
