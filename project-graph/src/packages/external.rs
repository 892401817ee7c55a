//! Public API symbols of external packages.
//!
//! Only each package's entry library is read, and only its public,
//! non-trivial declarations are kept, so the graph shows what the project can
//! touch without importing whole dependency trees.

use crate::{
    analysis::transform_raw_symbols,
    config::Filters,
    graph::packages::relevant_packages,
    lsp::LanguageService,
    model::{
        kind::SymbolKind,
        package::ExternalPackageInfo,
        symbol::{FileSymbols, Symbol},
    },
};
use futures::future::join_all;
use std::{fs, path::PathBuf};
use tracing::{debug, info, warn};
use url::Url;

const TRIVIAL_MEMBERS: &[&str] = &[
    "toString",
    "hashCode",
    "operator",
    "runtimeType",
    "noSuchMethod",
    "now",
    "parse",
    "tryParse",
];

/// `lib/<name>.dart`, else the first indexed source.
pub fn entry_library(pkg: &ExternalPackageInfo) -> Option<&PathBuf> {
    let conventional = pkg.path.join("lib").join(format!("{}.dart", pkg.name));
    pkg.dart_files
        .iter()
        .find(|f| **f == conventional)
        .or_else(|| pkg.dart_files.first())
}

fn is_public(name: &str) -> bool {
    !name.starts_with('_')
}

fn is_relevant_top_level(sym: &Symbol) -> bool {
    matches!(sym.kind, SymbolKind::Class | SymbolKind::Enum | SymbolKind::Function)
        && is_public(&sym.name)
        && sym.name.chars().count() > 2
}

fn is_relevant_member(sym: &Symbol) -> bool {
    is_public(&sym.name) && !TRIVIAL_MEMBERS.iter().any(|t| sym.name.contains(t))
}

fn keep_public_api(mut symbols: Vec<Symbol>) -> Vec<Symbol> {
    symbols.retain(is_relevant_top_level);
    for sym in &mut symbols {
        sym.children.retain(is_relevant_member);
    }
    symbols
}

/// Symbol forests of the relevant packages' entry libraries, filtered to
/// their public API. Service failures skip the package.
#[tracing::instrument(level = "info", skip_all, fields(packages = packages.len()))]
pub async fn collect_external_symbols(
    packages: &[ExternalPackageInfo],
    filters: &Filters,
    service: &dyn LanguageService,
) -> Vec<FileSymbols> {
    let entries: Vec<(String, PathBuf)> = relevant_packages(packages, filters)
        .into_iter()
        .filter(|pkg| pkg.has_lib_folder)
        .filter_map(|pkg| entry_library(pkg).map(|p| (pkg.name.clone(), p.clone())))
        .collect();

    let loaded = join_all(entries.iter().map(|(name, path)| async move {
        let Ok(url) = Url::from_file_path(path) else {
            debug!(package = %name, path = %path.display(), "Not an absolute path");
            return None;
        };
        let file_id = url.to_string();
        match service.lookup_symbols(&file_id).await {
            Ok(raw) => {
                let symbols = keep_public_api(transform_raw_symbols(&raw, &file_id));
                debug!(package = %name, kept = symbols.len(), "External symbols");
                Some(FileSymbols {
                    text: fs::read_to_string(path).unwrap_or_default(),
                    file_id,
                    symbols,
                })
            }
            Err(err) => {
                warn!(package = %name, error = %err, "External symbol lookup failed");
                None
            }
        }
    }))
    .await;

    let files: Vec<FileSymbols> = loaded
        .into_iter()
        .flatten()
        .filter(|f| !f.symbols.is_empty())
        .collect();
    info!(files = files.len(), "External symbols collected");
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{package::PackageType, symbol::RawSymbol},
        test_support::CannedService,
    };
    use std::path::Path;

    fn raw(name: &str, kind: u32, children: Vec<RawSymbol>) -> RawSymbol {
        RawSymbol {
            name: name.into(),
            kind,
            children,
            ..Default::default()
        }
    }

    fn http(root: &Path) -> ExternalPackageInfo {
        ExternalPackageInfo {
            name: "http".into(),
            path: root.to_path_buf(),
            version: "1.2.0".into(),
            package_type: PackageType::ThirdParty,
            dart_files: vec![root.join("lib/src/base.dart"), root.join("lib/http.dart")],
            has_lib_folder: true,
            is_flutter_package: false,
            description: None,
        }
    }

    #[test]
    fn prefers_conventional_entry_library() {
        let pkg = http(Path::new("/cache/http"));
        assert_eq!(entry_library(&pkg), Some(&PathBuf::from("/cache/http/lib/http.dart")));

        let mut other = pkg.clone();
        other.dart_files.pop();
        assert_eq!(entry_library(&other), Some(&PathBuf::from("/cache/http/lib/src/base.dart")));
    }

    #[tokio::test]
    async fn keeps_only_public_api() {
        let root = Path::new("/cache/http");
        let entry = Url::from_file_path(root.join("lib/http.dart")).unwrap().to_string();
        let mut svc = CannedService::default();
        svc.symbols.insert(
            entry.clone(),
            vec![
                raw(
                    "Client",
                    5,
                    vec![raw("send", 6, vec![]), raw("_pool", 8, vec![]), raw("toString", 6, vec![])],
                ),
                raw("_Internal", 5, vec![]),
                raw("get", 12, vec![]),
                raw("io", 12, vec![]),
                raw("Method", 10, vec![]),
                raw("version", 13, vec![]),
            ],
        );

        let files = collect_external_symbols(&[http(root)], &Filters::default(), &svc).await;
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_id, entry);
        let names: Vec<_> = files[0].symbols.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Client", "get", "Method"]);
        let members: Vec<_> = files[0].symbols[0].children.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(members, ["send"]);
    }
}
