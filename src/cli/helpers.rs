//! Shared helper functions for CLI commands

use miette::Result;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::bom::expand::{expand, ExpandOptions};
use crate::cli::GlobalOpts;
use crate::core::catalog::{Catalog, PartId};
use crate::core::project::Project;
use crate::core::Config;

/// Truncate a string to `max_len` characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format a money amount with two decimals, `-` when unknown
pub fn format_money(amount: Option<Decimal>) -> String {
    amount.map_or_else(
        || "-".to_string(),
        |a| format!("{:.2}", a.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)),
    )
}

/// Open the project named by `--project`, or the one around the current directory
pub fn open_project(global: &GlobalOpts) -> Result<Project> {
    Project::open(global.project.as_deref()).map_err(|e| miette::miette!("{}", e))
}

/// Open the project, its configuration and the loaded catalog
pub fn load_workspace(global: &GlobalOpts) -> Result<(Project, Config, Catalog)> {
    let project = open_project(global)?;
    let config = Config::load(Some(&project));
    let catalog = Catalog::load(&project)?;
    Ok((project, config, catalog))
}

/// Resolve a part number argument against the catalog
pub fn resolve_part(catalog: &Catalog, number: &str) -> Result<PartId> {
    Ok(catalog.resolve_str(number)?)
}

/// Reject structure edits that make an assembly contain itself
pub fn check_structure(catalog: &Catalog, config: &Config, assembly: PartId) -> Result<()> {
    let options = ExpandOptions {
        max_depth: Some(config.max_depth()),
        detect_cycles: true,
    };
    expand(catalog, assembly, &options)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
        assert_eq!(truncate_str("Ωhm résistor", 6), "Ωhm...");
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(Some(Decimal::new(6, 0))), "6.00");
        assert_eq!(format_money(Some(Decimal::new(12345, 3))), "12.35");
        assert_eq!(format_money(None), "-");
    }
}
