//! Type resolution by base name against the project's own declarations.
//!
//! The index is a flat snapshot of every class/enum/typedef (top-level and
//! nested) taken before enrichment starts, so lookups never contend with the
//! symbol trees being mutated. Results are cached by the literal type string.

use crate::{
    core::names::{is_sdk_file, parse_base_type_name},
    model::symbol::{FileSymbols, TypeDefinition, TypeReference},
};
use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};
use tracing::debug;

#[derive(Debug, Default)]
pub struct TypeResolver {
    index: Vec<TypeDefinition>,
    cache: Mutex<HashMap<String, TypeReference>>,
}

impl TypeResolver {
    /// Rebuild the declaration index. Order follows `files`, pre-order within
    /// each file, which makes "first match wins" deterministic.
    pub fn index_files(&mut self, files: &[FileSymbols]) {
        self.index.clear();
        for file in files {
            file.walk(&mut |sym| {
                if sym.kind.is_type_definition() {
                    self.index.push(TypeDefinition {
                        name: sym.name.clone(),
                        kind: sym.kind,
                        file_id: sym.file_id.clone(),
                        selection_range: sym.selection_range,
                        is_sdk: is_sdk_file(&sym.file_id),
                    });
                }
            });
        }
        debug!(definitions = self.index.len(), "Type index rebuilt");
    }

    /// Resolve `type_name`; the result is cached whether or not it was found.
    pub fn resolve(&self, type_name: &str) -> TypeReference {
        if let Some(hit) = self.lock().get(type_name) {
            return hit.clone();
        }

        let base = parse_base_type_name(type_name);
        let definition = self.index.iter().find(|d| d.name == base).cloned();
        let resolved = TypeReference {
            name: type_name.to_string(),
            definition,
        };

        self.lock().insert(type_name.to_string(), resolved.clone());
        resolved
    }

    /// Drop cached lookups and the index.
    pub fn clear(&mut self) {
        self.index.clear();
        self.lock().clear();
    }

    pub fn cached_len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, TypeReference>> {
        // Entries are inserted whole; a poisoned map is still consistent.
        self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }
}
