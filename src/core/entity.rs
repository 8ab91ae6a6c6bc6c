//! Entity trait - common interface for records stored as YAML files

use serde::{de::DeserializeOwned, Serialize};

/// Common trait for all stored entities
pub trait Entity: Serialize + DeserializeOwned {
    /// Human-readable entity kind (e.g., "part", "offer")
    const KIND: &'static str;

    /// Project directory holding one file per entity
    const DIRECTORY: &'static str;

    /// Stable key used as the file stem
    fn key(&self) -> String;
}
