//! Configuration data structures for the symbol → project graph pipeline.
//!
//! Groups:
//! - [`AnalysisConfig`]: top-level container for all config groups
//! - [`Limits`]: windows, caps and hop bounds
//! - [`FeatureFlags`]: toggles for the optional (expensive) strategies
//! - [`Filters`]: packages and files left out of the graph
//!
//! All structs are `serde`-friendly so they can be loaded from YAML/JSON.
//! Every field has a default, so a partial `archgraph.yml` is valid.

use crate::errors::{GraphError, Result};
use serde::{Deserialize, Serialize};

/// Top-level configuration for one analysis run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub limits: Limits,
    pub features: FeatureFlags,
    pub filters: Filters,
}

impl AnalysisConfig {
    /// Validate config sanity (no degenerate or absurd values).
    pub fn validate(&self) -> Result<()> {
        if self.limits.regex_window_lines == 0 || self.limits.regex_window_lines > 50 {
            return Err(GraphError::Config(format!(
                "`regex_window_lines` must be within 1..=50, got {}",
                self.limits.regex_window_lines
            )));
        }
        if self.limits.data_flow_max_hops == 0 || self.limits.data_flow_max_hops > 100 {
            return Err(GraphError::Config(format!(
                "`data_flow_max_hops` must be within 1..=100, got {}",
                self.limits.data_flow_max_hops
            )));
        }
        if self.limits.max_package_files == 0 {
            return Err(GraphError::Config(
                "`max_package_files` must be greater than 0".into(),
            ));
        }
        if self.limits.root_search_levels == 0 {
            return Err(GraphError::Config(
                "`root_search_levels` must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Windows, caps and hop bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Source lines scanned above a declaration by the regex fallback.
    pub regex_window_lines: usize,
    /// Maximum number of source files indexed per external package.
    pub max_package_files: usize,
    /// Directory depth below a package's `lib/` when indexing sources.
    pub package_scan_depth: usize,
    /// Hops followed in each direction by `trace_data_flow`.
    pub data_flow_max_hops: usize,
    /// Parent directories searched for `pubspec.yaml`.
    pub root_search_levels: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            regex_window_lines: 5,
            max_package_files: 20,
            package_scan_depth: 3,
            data_flow_max_hops: 10,
            root_search_levels: 10,
        }
    }
}

/// Optional strategies and passes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    /// Query hover info for symbols still missing types after detail parsing.
    pub hover_fallback: bool,
    /// Scan source lines above a declaration as the last resort.
    pub regex_fallback: bool,
    /// Query references to derive READS_FROM edges.
    pub reads_from_edges: bool,
    /// Discover dependencies and group their nodes under package containers.
    pub package_integration: bool,
    /// Pull public symbols of external packages into the graph.
    pub external_symbols: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            hover_fallback: true,
            regex_fallback: true,
            reads_from_edges: true,
            package_integration: true,
            external_symbols: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Filters {
    /// Packages that never get a container node.
    pub framework_packages: Vec<String>,
    /// Glob patterns for source files the CLI should not analyze.
    pub ignore_globs: Vec<String>,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            framework_packages: vec!["flutter".into(), "flutter_test".into()],
            ignore_globs: vec![
                "**/*.g.dart".into(),
                "**/*.freezed.dart".into(),
                "**/.dart_tool/**".into(),
                "**/build/**".into(),
            ],
        }
    }
}
