//! Configuration loader and validator.
//!
//! Responsibilities:
//! - Read `archgraph.yml` from the project root when present
//! - Apply `ARCHGRAPH_*` environment overrides on top
//! - Validate constraints (e.g., the regex window must be non-empty)

pub mod model;

pub use model::{AnalysisConfig, FeatureFlags, Filters, Limits};

use crate::errors::{GraphError, Result};
use std::{fs, path::Path};
use tracing::{debug, info};

/// Config file looked up in the project root.
pub const CONFIG_FILE: &str = "archgraph.yml";

/// Load [`AnalysisConfig`] for `root`: file (if any) → env overrides → validation.
pub fn load(root: &Path) -> Result<AnalysisConfig> {
    let path = root.join(CONFIG_FILE);
    let mut cfg = if path.is_file() {
        let raw = fs::read_to_string(&path)?;
        let cfg: AnalysisConfig = serde_yml::from_str(&raw)?;
        info!(path = %path.display(), "Loaded config file");
        cfg
    } else {
        debug!(root = %root.display(), "No config file, using defaults");
        AnalysisConfig::default()
    };

    apply_overrides(&mut cfg, |key| std::env::var(key).ok())?;
    cfg.validate()?;
    Ok(cfg)
}

/// Apply `ARCHGRAPH_*` overrides using `lookup` as the variable source.
pub fn apply_overrides<F>(cfg: &mut AnalysisConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("ARCHGRAPH_REGEX_WINDOW") {
        cfg.limits.regex_window_lines = parse_usize("ARCHGRAPH_REGEX_WINDOW", &v)?;
    }
    if let Some(v) = lookup("ARCHGRAPH_MAX_PACKAGE_FILES") {
        cfg.limits.max_package_files = parse_usize("ARCHGRAPH_MAX_PACKAGE_FILES", &v)?;
    }
    if is_truthy(lookup("ARCHGRAPH_DISABLE_HOVER")) {
        cfg.features.hover_fallback = false;
    }
    if is_truthy(lookup("ARCHGRAPH_DISABLE_PACKAGES")) {
        cfg.features.package_integration = false;
        cfg.features.external_symbols = false;
    }
    Ok(())
}

fn parse_usize(key: &str, raw: &str) -> Result<usize> {
    raw.trim()
        .parse()
        .map_err(|_| GraphError::Config(format!("{key} is not a number: {raw:?}")))
}

fn is_truthy(v: Option<String>) -> bool {
    matches!(
        v.as_deref().map(str::trim),
        Some("1") | Some("true") | Some("yes")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn overrides_apply_on_top_of_defaults() {
        let env: HashMap<&str, &str> = [
            ("ARCHGRAPH_REGEX_WINDOW", "3"),
            ("ARCHGRAPH_DISABLE_PACKAGES", "true"),
        ]
        .into_iter()
        .collect();

        let mut cfg = AnalysisConfig::default();
        apply_overrides(&mut cfg, |k| env.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(cfg.limits.regex_window_lines, 3);
        assert!(!cfg.features.package_integration);
        assert!(!cfg.features.external_symbols);
        assert!(cfg.features.hover_fallback);
    }

    #[test]
    fn bad_number_is_a_config_error() {
        let mut cfg = AnalysisConfig::default();
        let res = apply_overrides(&mut cfg, |k| {
            (k == "ARCHGRAPH_MAX_PACKAGE_FILES").then(|| "many".to_string())
        });
        assert!(matches!(res, Err(GraphError::Config(_))));
    }

    #[test]
    fn loads_file_from_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "features:\n  hover_fallback: false\n",
        )
        .unwrap();

        let cfg = load(dir.path()).unwrap();
        assert!(!cfg.features.hover_fallback);
        assert_eq!(cfg.limits.data_flow_max_hops, 10);
    }
}
