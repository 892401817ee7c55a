//! Language service backed by a recorded symbol snapshot.
//!
//! Answers `lookup_symbols` from JSON captured earlier; hover and references
//! are always empty, so only detail parsing and the regex fallback apply.

use crate::{
    errors::Result,
    lsp::{HoverInfo, LanguageService, Location, ServiceFuture},
    model::{span::Position, symbol::RawSymbol},
};
use serde::Deserialize;
use std::{collections::HashMap, fs, path::Path};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotEntry {
    file_id: String,
    #[serde(default)]
    symbols: Vec<RawSymbol>,
}

#[derive(Debug, Clone, Default)]
pub struct SnapshotService {
    files: HashMap<String, Vec<RawSymbol>>,
}

impl SnapshotService {
    /// Parse `[{ "fileId": .., "symbols": [..] }, ..]`.
    pub fn from_json(raw: &str) -> Result<Self> {
        let entries: Vec<SnapshotEntry> = serde_json::from_str(raw)?;
        Ok(Self {
            files: entries.into_iter().map(|e| (e.file_id, e.symbols)).collect(),
        })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// File ids present in the snapshot, sorted.
    pub fn file_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.files.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl LanguageService for SnapshotService {
    fn lookup_symbols<'a>(&'a self, file_id: &'a str) -> ServiceFuture<'a, Vec<RawSymbol>> {
        let symbols = self.files.get(file_id).cloned().unwrap_or_default();
        Box::pin(async move { Ok(symbols) })
    }

    fn hover<'a>(&'a self, _file_id: &'a str, _pos: Position) -> ServiceFuture<'a, Option<HoverInfo>> {
        Box::pin(async { Ok(None) })
    }

    fn references<'a>(
        &'a self,
        _file_id: &'a str,
        _pos: Position,
    ) -> ServiceFuture<'a, Vec<Location>> {
        Box::pin(async { Ok(Vec::new()) })
    }
}
