//! Dependency discovery from `.dart_tool/package_config.json`.

use crate::{
    config::Limits,
    errors::{GraphError, Result},
    model::package::ExternalPackageInfo,
    packages::analyzer::{ProjectManifest, analyze_external_package},
};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};
use url::Url;

#[derive(Debug, Deserialize)]
struct PackageConfig {
    #[serde(default)]
    packages: Vec<PackageEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageEntry {
    name: Option<String>,
    root_uri: Option<String>,
}

/// Nearest directory holding a `pubspec.yaml`, starting at `start` (or its
/// parent when `start` is a file) and climbing at most `max_levels` times.
pub fn find_project_root(start: &Path, max_levels: usize) -> Option<PathBuf> {
    let start = dunce::canonicalize(start).unwrap_or_else(|_| start.to_path_buf());
    let mut dir = if start.is_file() {
        start.parent()?.to_path_buf()
    } else {
        start
    };
    for _ in 0..=max_levels {
        if dir.join("pubspec.yaml").is_file() {
            return Some(dir);
        }
        dir = dir.parent()?.to_path_buf();
    }
    None
}

/// Resolve a `rootUri` entry. Relative URIs are relative to `.dart_tool/`.
pub fn resolve_root_uri(root_uri: &str, dart_tool_dir: &Path) -> Option<PathBuf> {
    if root_uri.starts_with("file:") {
        return Url::parse(root_uri).ok()?.to_file_path().ok();
    }
    let joined = dart_tool_dir.join(root_uri.trim_end_matches('/'));
    Some(dunce::canonicalize(&joined).unwrap_or(joined))
}

/// Every package listed in the project's package config, analyzed.
///
/// Entries without a name or root, and packages whose directory is missing,
/// are skipped.
#[tracing::instrument(level = "info", skip_all, fields(start = %start.display()))]
pub fn discover_packages(start: &Path, limits: &Limits) -> Result<Vec<ExternalPackageInfo>> {
    let root = find_project_root(start, limits.root_search_levels)
        .ok_or_else(|| GraphError::ManifestNotFound(start.to_path_buf()))?;
    let dart_tool = root.join(".dart_tool");
    let config_path = dart_tool.join("package_config.json");
    if !config_path.is_file() {
        return Err(GraphError::ManifestNotFound(config_path));
    }

    let config: PackageConfig = serde_json::from_str(&fs::read_to_string(&config_path)?)?;
    let manifest = ProjectManifest::load(&root);
    debug!(entries = config.packages.len(), root = %root.display(), "Package config read");

    let mut packages = Vec::with_capacity(config.packages.len());
    for entry in config.packages {
        let (Some(name), Some(root_uri)) = (entry.name, entry.root_uri) else {
            debug!("Skipping package entry without name or rootUri");
            continue;
        };
        let Some(path) = resolve_root_uri(&root_uri, &dart_tool) else {
            warn!(package = %name, uri = %root_uri, "Unresolvable rootUri");
            continue;
        };
        match analyze_external_package(&name, &path, &manifest, limits) {
            Ok(info) => packages.push(info),
            Err(err) => debug!(package = %name, error = %err, "Package skipped"),
        }
    }

    info!(count = packages.len(), "Packages discovered");
    Ok(packages)
}

/// [`discover_packages`] with failures logged and read as "no packages".
pub fn find_all_packages(start: &Path, limits: &Limits) -> Vec<ExternalPackageInfo> {
    discover_packages(start, limits).unwrap_or_else(|err| {
        warn!(error = %err, "Package discovery skipped");
        Vec::new()
    })
}
