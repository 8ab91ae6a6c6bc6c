//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::PathBuf;

use crate::bom::price::OfferOrder;
use crate::core::Project;
use crate::entities::part::OrgContext;

/// Build quantity used when none is configured
pub const DEFAULT_BUILD_QUANTITY: u64 = 100;

/// Expansion depth limit used when none is configured
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// IndaBOM configuration with layered hierarchy
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Organization name (manufacturer of in-house parts)
    pub organization: Option<String>,

    /// Number of top-level assemblies to cost
    pub build_quantity: Option<u64>,

    /// Maximum assembly nesting depth
    pub max_depth: Option<usize>,

    /// Offer enumeration order for price resolution
    pub offer_order: Option<OfferOrder>,

    /// Default output format
    pub default_format: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load(project: Option<&Project>) -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (accessors below)

        // 2. Global user config (~/.config/indabom/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // 3. Project config (.indabom/config.yaml)
        if let Some(project) = project {
            if let Some(project_config) = Self::read_file(&project.config_dir().join("config.yaml")) {
                config.merge(project_config);
            }
        }

        // 4. Environment variables
        if let Ok(org) = std::env::var("INDABOM_ORGANIZATION") {
            config.organization = Some(org);
        }
        if let Ok(qty) = std::env::var("INDABOM_BUILD_QTY") {
            match qty.parse() {
                Ok(qty) => config.build_quantity = Some(qty),
                Err(_) => tracing::warn!(value = %qty, "ignoring non-numeric INDABOM_BUILD_QTY"),
            }
        }

        config
    }

    fn read_file(path: &std::path::Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        // Freshly initialized configs are all comments
        if contents
            .lines()
            .all(|l| l.trim().is_empty() || l.trim_start().starts_with('#'))
        {
            return None;
        }
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config file");
                None
            }
        }
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "indabom")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.organization.is_some() {
            self.organization = other.organization;
        }
        if other.build_quantity.is_some() {
            self.build_quantity = other.build_quantity;
        }
        if other.max_depth.is_some() {
            self.max_depth = other.max_depth;
        }
        if other.offer_order.is_some() {
            self.offer_order = other.offer_order;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }

    /// Organization context, falling back to the user name
    pub fn org_context(&self) -> OrgContext {
        let name = self.organization.clone().unwrap_or_else(|| {
            std::env::var("USER")
                .or_else(|_| std::env::var("USERNAME"))
                .unwrap_or_else(|_| "unknown".to_string())
        });
        OrgContext::new(name)
    }

    pub fn build_quantity(&self) -> u64 {
        self.build_quantity.unwrap_or(DEFAULT_BUILD_QUANTITY)
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth.unwrap_or(DEFAULT_MAX_DEPTH)
    }

    pub fn offer_order(&self) -> OfferOrder {
        self.offer_order.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.build_quantity(), 100);
        assert_eq!(config.max_depth(), 64);
        assert_eq!(config.offer_order(), OfferOrder::MoqAscending);
    }

    #[test]
    fn test_merge_prefers_other() {
        let mut base: Config = serde_yml::from_str("organization: Base\nbuild_quantity: 10\n").unwrap();
        let other: Config = serde_yml::from_str("build_quantity: 25\noffer_order: listed\n").unwrap();
        base.merge(other);

        assert_eq!(base.organization.as_deref(), Some("Base"));
        assert_eq!(base.build_quantity(), 25);
        assert_eq!(base.offer_order(), OfferOrder::Listed);
    }

    #[test]
    fn test_commented_config_is_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "# organization: \"\"\n\n# max_depth: 64\n").unwrap();
        assert!(Config::read_file(&path).is_none());

        std::fs::write(&path, "max_depth: 8\n").unwrap();
        assert_eq!(Config::read_file(&path).unwrap().max_depth(), 8);
    }

    #[test]
    fn test_org_context_uses_organization() {
        let config: Config = serde_yml::from_str("organization: Acme\n").unwrap();
        assert_eq!(config.org_context().name, "Acme");
    }
}
