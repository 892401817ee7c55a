//! External dependency model.

use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter},
    path::PathBuf,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageType {
    Sdk,
    FlutterOfficial,
    ThirdParty,
    Custom,
}

impl Display for PackageType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PackageType::Sdk => "sdk",
            PackageType::FlutterOfficial => "flutter_official",
            PackageType::ThirdParty => "third_party",
            PackageType::Custom => "custom",
        };
        f.write_str(s)
    }
}

/// One resolved dependency. Built once per run, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalPackageInfo {
    pub name: String,
    pub path: PathBuf,
    pub version: String,
    pub package_type: PackageType,
    /// Capped list of `.dart` sources below `lib/`.
    pub dart_files: Vec<PathBuf>,
    pub has_lib_folder: bool,
    pub is_flutter_package: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Project,
    ExternalPackage,
    Sdk,
}

/// Origin of a node's file. Derived per node, never stored on the symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSource {
    pub kind: SourceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_type: Option<PackageType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_path: Option<String>,
}

impl FileSource {
    pub fn project() -> Self {
        Self {
            kind: SourceKind::Project,
            package_name: None,
            package_version: None,
            package_type: None,
            relative_path: None,
        }
    }

    pub fn sdk() -> Self {
        Self {
            kind: SourceKind::Sdk,
            ..Self::project()
        }
    }
}
