//! `this.field` closure pass.
//!
//! Runs after every file is enriched: constructor parameters still carrying a
//! `self_field:<name>` placeholder take the type of the sibling field with
//! that name. Also links constructors to their class and checks that every
//! parent link points at a symbol seen earlier in the walk.

use crate::model::{
    kind::SymbolKind,
    symbol::{FileSymbols, Symbol, TypeReference},
};
use std::collections::HashSet;
use tracing::{debug, error};

/// Outcome counters, mostly for logs and tests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ClosureStats {
    pub resolved: usize,
    pub unresolved: usize,
    pub broken_parent_links: usize,
}

pub fn resolve_this_fields(files: &mut [FileSymbols]) -> ClosureStats {
    let mut stats = ClosureStats::default();
    for file in files.iter_mut() {
        for sym in file.symbols.iter_mut() {
            close_class(sym, &mut stats);
        }
        let mut seen = HashSet::new();
        for sym in &file.symbols {
            check_parent_links(sym, &mut seen, &mut stats);
        }
    }
    debug!(
        resolved = stats.resolved,
        unresolved = stats.unresolved,
        "this.field closure done"
    );
    stats
}

fn close_class(sym: &mut Symbol, stats: &mut ClosureStats) {
    if sym.kind == SymbolKind::Class && !sym.children.is_empty() {
        // Field types are read from a snapshot so constructors can be mutated.
        let fields: Vec<(String, Option<String>, Option<TypeReference>)> = sym
            .children
            .iter()
            .filter(|c| c.kind.is_field_like())
            .map(|c| (c.name.clone(), c.resolved_type.clone(), c.resolved_type_ref.clone()))
            .collect();
        let class_id = sym.unique_id.clone();

        for member in sym.children.iter_mut() {
            if member.kind != SymbolKind::Constructor {
                continue;
            }
            let Some(params) = member.parameters.as_mut().filter(|p| !p.is_empty()) else {
                continue;
            };
            if member.parent_id.is_none() {
                member.parent_id = Some(class_id.clone());
            }

            for param in params.iter_mut() {
                let Some(field_name) = param.self_field().map(str::to_string) else {
                    continue;
                };
                match fields.iter().find(|(name, _, _)| *name == field_name) {
                    Some((_, Some(ty), ty_ref)) => {
                        param.type_ref = Some(
                            ty_ref
                                .clone()
                                .unwrap_or_else(|| TypeReference::unresolved(ty.clone())),
                        );
                        param.ty = ty.clone();
                        stats.resolved += 1;
                    }
                    _ => {
                        debug!(class = %sym.name, field = %field_name, "this.field left unresolved");
                        param.type_ref = Some(TypeReference::unresolved(param.ty.clone()));
                        stats.unresolved += 1;
                    }
                }
            }
        }
    }

    for child in sym.children.iter_mut() {
        close_class(child, stats);
    }
}

fn check_parent_links<'a>(sym: &'a Symbol, seen: &mut HashSet<&'a str>, stats: &mut ClosureStats) {
    seen.insert(sym.unique_id.as_str());
    if let Some(parent) = sym.parent_id.as_deref() {
        if !seen.contains(parent) {
            error!(symbol = %sym.name, parent, "Parent link points to an unknown symbol");
            stats.broken_parent_links += 1;
        }
    }
    for child in &sym.children {
        check_parent_links(child, seen, stats);
    }
}
