//! Per-package details and origin classification.
//!
//! - [`ProjectManifest`] reads the project's own `pubspec.yaml` once: path-based
//!   dependencies in `dependencies`, `dev_dependencies` and `dependency_overrides`,
//!   plus every dev dependency.
//! - [`determine_package_type`] classifies a package as custom, flutter_official,
//!   sdk or third_party.
//! - [`analyze_external_package`] builds an [`ExternalPackageInfo`] from the
//!   package's own manifest and `lib/` tree.

use crate::{
    config::Limits,
    errors::{GraphError, Result},
    model::package::{ExternalPackageInfo, PackageType},
    packages::files::find_dart_files,
};
use serde::Deserialize;
use serde_yml::Value;
use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

const FLUTTER_OFFICIAL: &[&str] = &[
    "flutter",
    "flutter_test",
    "flutter_web_plugins",
    "flutter_driver",
    "integration_test",
    "flutter_localizations",
    "material",
    "cupertino",
];

/// Dependency facts of the analyzed project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectManifest {
    pub root: PathBuf,
    pub path_deps: HashSet<String>,
    pub dev_deps: HashSet<String>,
}

impl ProjectManifest {
    /// A missing or unreadable pubspec yields an empty manifest.
    pub fn load(root: &Path) -> Self {
        let mut manifest = Self {
            root: root.to_path_buf(),
            ..Default::default()
        };
        let Some(val) = read_yaml(&root.join("pubspec.yaml")) else {
            return manifest;
        };
        for key in ["dependencies", "dev_dependencies", "dependency_overrides"] {
            collect_path_deps_into(&val, key, &mut manifest.path_deps);
        }
        if let Some(dev) = val.get("dev_dependencies").and_then(Value::as_mapping) {
            manifest
                .dev_deps
                .extend(dev.keys().filter_map(Value::as_str).map(str::to_string));
        }
        manifest
    }

    fn declares_locally(&self, name: &str) -> bool {
        self.path_deps.contains(name) || self.dev_deps.contains(name)
    }
}

fn collect_path_deps_into(root: &Value, key: &str, out: &mut HashSet<String>) {
    let Some(map) = root.get(key).and_then(Value::as_mapping) else {
        return;
    };
    for (k, v) in map {
        let Some(dep_name) = k.as_str() else {
            continue;
        };
        if v.get("path").and_then(Value::as_str).is_some() {
            debug!(dep = dep_name, section = key, "Path-based dependency");
            out.insert(dep_name.to_string());
        }
    }
}

fn read_yaml(path: &Path) -> Option<Value> {
    let content = fs::read_to_string(path).ok()?;
    match serde_yml::from_str(&content) {
        Ok(v) => Some(v),
        Err(err) => {
            debug!(path = %path.display(), error = %err, "Unparseable pubspec");
            None
        }
    }
}

pub fn determine_package_type(name: &str, path: &Path, manifest: &ProjectManifest) -> PackageType {
    let under_root = !manifest.root.as_os_str().is_empty() && path.starts_with(&manifest.root);
    if under_root || manifest.declares_locally(name) {
        return PackageType::Custom;
    }
    if FLUTTER_OFFICIAL.contains(&name) || name.starts_with("flutter_") {
        return PackageType::FlutterOfficial;
    }
    let p = path.to_string_lossy().replace('\\', "/");
    if p.contains("dart-sdk") || p.contains("flutter/bin/cache/dart-sdk") {
        return PackageType::Sdk;
    }
    PackageType::ThirdParty
}

#[derive(Debug, Default, Deserialize)]
struct PackagePubspec {
    #[serde(default)]
    version: Option<Value>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    dependencies: Option<Value>,
}

impl PackagePubspec {
    fn version(&self) -> Option<String> {
        match self.version.as_ref()? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    fn depends_on_flutter_sdk(&self) -> bool {
        self.dependencies
            .as_ref()
            .and_then(Value::as_mapping)
            .is_some_and(|deps| {
                deps.values()
                    .any(|d| d.get("sdk").and_then(Value::as_str) == Some("flutter"))
            })
    }
}

pub fn analyze_external_package(
    name: &str,
    path: &Path,
    manifest: &ProjectManifest,
    limits: &Limits,
) -> Result<ExternalPackageInfo> {
    if !path.exists() {
        return Err(GraphError::PackageNotFound(path.to_path_buf()));
    }

    let package_type = determine_package_type(name, path, manifest);
    let pubspec = match fs::read_to_string(path.join("pubspec.yaml")) {
        Ok(raw) => serde_yml::from_str::<PackagePubspec>(&raw).unwrap_or_else(|err| {
            debug!(package = name, error = %err, "Package pubspec not understood");
            PackagePubspec::default()
        }),
        Err(_) => PackagePubspec::default(),
    };

    let lib = path.join("lib");
    let has_lib_folder = lib.is_dir();
    let dart_files = if has_lib_folder {
        find_dart_files(&lib, limits.package_scan_depth, limits.max_package_files)
    } else {
        Vec::new()
    };
    debug!(package = name, kind = %package_type, files = dart_files.len(), "Package analyzed");

    Ok(ExternalPackageInfo {
        name: name.to_string(),
        path: path.to_path_buf(),
        version: pubspec.version().unwrap_or_else(|| "unknown".to_string()),
        package_type,
        dart_files,
        has_lib_folder,
        is_flutter_package: pubspec.depends_on_flutter_sdk(),
        description: pubspec
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string),
    })
}
