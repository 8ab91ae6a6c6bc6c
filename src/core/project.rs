//! Project discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::entity::Entity;

/// Name of the per-project configuration directory
pub const PROJECT_DIR: &str = ".indabom";

/// Entity directories created by `init`
const ENTITY_DIRS: &[&str] = &["parts", "offers"];

/// Represents an IndaBOM project
#[derive(Debug, Clone)]
pub struct Project {
    /// Root directory of the project (parent of .indabom/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current = std::env::current_dir().map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            if current.join(PROJECT_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Open the project at `path` or, if `None`, discover it from the current directory
    pub fn open(path: Option<&Path>) -> Result<Self, ProjectError> {
        match path {
            Some(p) => Self::discover_from(p),
            None => Self::discover(),
        }
    }

    /// Create a new project structure at the given path
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        if root.join(PROJECT_DIR).exists() {
            return Err(ProjectError::AlreadyExists(root));
        }

        Self::create_structure(root)
    }

    /// Force initialization even if .indabom/ exists
    pub fn init_force(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        Self::create_structure(root)
    }

    fn create_structure(root: PathBuf) -> Result<Self, ProjectError> {
        let config_dir = root.join(PROJECT_DIR);
        std::fs::create_dir_all(&config_dir).map_err(|e| ProjectError::IoError(e.to_string()))?;

        std::fs::write(config_dir.join("config.yaml"), Self::default_config())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        for dir in ENTITY_DIRS {
            std::fs::create_dir_all(root.join(dir))
                .map_err(|e| ProjectError::IoError(e.to_string()))?;
        }

        Ok(Self { root })
    }

    fn default_config() -> &'static str {
        r#"# IndaBOM Project Configuration

# Organization name, used as manufacturer for in-house parts
# organization: ""

# Number of top-level assemblies to cost by default
# build_quantity: 100

# Maximum assembly nesting depth before expansion gives up
# max_depth: 64

# Offer enumeration order for price resolution (moq-ascending, listed)
# offer_order: moq-ascending

# Default output format (auto, tsv, csv, json, yaml, md)
# default_format: auto
"#
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .indabom configuration directory
    pub fn config_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    /// Directory holding entities of type `T`
    pub fn entity_dir<T: Entity>(&self) -> PathBuf {
        self.root.join(T::DIRECTORY)
    }

    /// Path of the file storing `entity`
    pub fn entity_path<T: Entity>(&self, entity: &T) -> PathBuf {
        self.entity_dir::<T>().join(format!("{}.yaml", entity.key()))
    }

    /// Iterate all entity files of type `T`, sorted by file name
    pub fn iter_entity_files<T: Entity>(&self) -> impl Iterator<Item = PathBuf> {
        walkdir::WalkDir::new(self.entity_dir::<T>())
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "yaml"))
            .map(|e| e.path().to_path_buf())
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not an IndaBOM project (searched from {searched_from:?}). Run 'indabom init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("IndaBOM project already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}
