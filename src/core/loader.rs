//! Entity loading utilities
//!
//! Generic helpers for reading and writing entity YAML files, so the catalog
//! does not repeat the file plumbing for every entity type.

use std::fs;
use std::path::PathBuf;

use crate::core::entity::Entity;
use crate::core::project::Project;
use crate::yaml::{parse_yaml_file, YamlError};

/// Load all entities of type T from their project directory
///
/// Files are read in file-name order. Unlike a lenient listing, a file
/// that fails to parse is an error: silently dropping a part would change
/// every rollup that uses it.
pub fn load_all<T: Entity>(project: &Project) -> Result<Vec<(PathBuf, T)>, YamlError> {
    let mut entities = Vec::new();

    for path in project.iter_entity_files::<T>() {
        let entity = parse_yaml_file::<T>(&path)?;
        entities.push((path, entity));
    }

    tracing::debug!(kind = T::KIND, count = entities.len(), "loaded entities");
    Ok(entities)
}

/// Write an entity to its file, creating the directory if needed
pub fn save_entity<T: Entity>(project: &Project, entity: &T) -> Result<PathBuf, SaveError> {
    let dir = project.entity_dir::<T>();
    if !dir.exists() {
        fs::create_dir_all(&dir).map_err(|source| SaveError::Io {
            path: dir.clone(),
            source,
        })?;
    }

    let path = project.entity_path(entity);
    let yaml = serde_yml::to_string(entity)?;
    fs::write(&path, yaml).map_err(|source| SaveError::Io {
        path: path.clone(),
        source,
    })?;

    Ok(path)
}

/// Errors writing entity files
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize entity: {0}")]
    Serialize(#[from] serde_yml::Error),
}
