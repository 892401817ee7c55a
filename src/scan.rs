//! Dart source discovery for the CLI.

use anyhow::{Context, Result, bail};
use globset::{Glob, GlobSet, GlobSetBuilder};
use project_graph::SourceFile;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};
use url::Url;
use walkdir::{DirEntry, WalkDir};

const SKIPPED_DIRS: &[&str] = &[".dart_tool", "build", ".git", "graphs_data"];

/// Build a [`GlobSet`] from patterns, skipping invalid or empty ones.
pub fn build_globset(patterns: &[String]) -> Option<GlobSet> {
    if patterns.is_empty() {
        return None;
    }
    let mut builder = GlobSetBuilder::new();
    for pat in patterns.iter().filter(|p| !p.trim().is_empty()) {
        match Glob::new(pat) {
            Ok(g) => {
                builder.add(g);
            }
            Err(err) => warn!(pattern = %pat, error = %err, "Invalid ignore glob"),
        }
    }
    builder.build().ok()
}

fn keep_entry(e: &DirEntry) -> bool {
    if e.depth() == 0 || !e.file_type().is_dir() {
        return true;
    }
    let name = e.file_name().to_string_lossy();
    !name.starts_with('.') && !SKIPPED_DIRS.contains(&name.as_ref())
}

/// Every `.dart` file under `root` not matched by `ignore_globs`, sorted by
/// path. Globs match the root-relative path with `/` separators.
pub fn scan_dart_files(root: &Path, ignore_globs: &[String]) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        bail!("project root is not a directory: {}", root.display());
    }
    let ignore = build_globset(ignore_globs);
    let mut skipped = 0usize;
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(keep_entry);
    for entry in walker.filter_map(|e| e.ok()) {
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "dart") {
            continue;
        }
        let rel = path
            .strip_prefix(root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");
        if ignore.as_ref().is_some_and(|gs| gs.is_match(&rel)) {
            skipped += 1;
            debug!(file = %rel, "Ignored by glob");
            continue;
        }
        files.push(path.to_path_buf());
    }
    info!(files = files.len(), skipped, root = %root.display(), "Scanned Dart sources");
    Ok(files)
}

/// Read each file and key it by its `file://` URI.
pub fn load_sources(paths: &[PathBuf]) -> Result<Vec<SourceFile>> {
    paths
        .iter()
        .map(|path| {
            let file_id = Url::from_file_path(path)
                .map_err(|_| anyhow::anyhow!("not an absolute path: {}", path.display()))?
                .to_string();
            let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            Ok(SourceFile {
                file_id,
                text,
                symbols: None,
            })
        })
        .collect()
}
