use crate::model::package::{ExternalPackageInfo, FileSource, PackageType, SourceKind};
use std::path::{Path, PathBuf};
use url::Url;

/// Filesystem path of a file id (`file://` URI or plain path).
pub fn file_id_to_path(file_id: &str) -> Option<PathBuf> {
    if file_id.is_empty() {
        return None;
    }
    if file_id.starts_with("file:") {
        return Url::parse(file_id).ok()?.to_file_path().ok();
    }
    Some(PathBuf::from(file_id))
}

pub fn is_sdk_path(path: &Path) -> bool {
    let p = path.to_string_lossy().replace('\\', "/");
    p.contains("dart-sdk/lib") || p.contains("flutter/bin/cache/dart-sdk")
}

/// Package owning `path`, if any. The deepest package root wins.
pub fn owning_package<'a>(path: &Path, packages: &'a [ExternalPackageInfo]) -> Option<&'a ExternalPackageInfo> {
    packages
        .iter()
        .filter(|pkg| path.starts_with(&pkg.path))
        .max_by_key(|pkg| pkg.path.components().count())
}

/// Origin of the file behind `file_id`. Files of custom packages count as
/// project files but keep their package details.
pub fn determine_file_source(file_id: &str, packages: &[ExternalPackageInfo]) -> FileSource {
    let Some(path) = file_id_to_path(file_id) else {
        return FileSource::project();
    };
    if is_sdk_path(&path) {
        return FileSource {
            package_type: Some(PackageType::Sdk),
            ..FileSource::sdk()
        };
    }
    let Some(pkg) = owning_package(&path, packages) else {
        return FileSource::project();
    };

    FileSource {
        kind: if pkg.package_type == PackageType::Custom {
            SourceKind::Project
        } else {
            SourceKind::ExternalPackage
        },
        package_name: Some(pkg.name.clone()),
        package_version: Some(pkg.version.clone()),
        package_type: Some(pkg.package_type),
        relative_path: pathdiff::diff_paths(&path, &pkg.path)
            .map(|rel| rel.to_string_lossy().replace('\\', "/")),
    }
}
