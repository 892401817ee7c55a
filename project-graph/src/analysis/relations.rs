//! Class inheritance extracted from detail strings.
//!
//! Runs once before enrichment; basic enrichment later copies the record
//! onto the class keyed by `(file id, class name without generics)`.

use crate::{
    core::names::strip_generics,
    model::{
        kind::SymbolKind,
        symbol::{FileSymbols, RelationTarget, Relations, Symbol},
    },
};
use regex::Regex;
use std::{collections::HashMap, sync::LazyLock};

static CLAUSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(extends|with|implements|on)\s+").expect("valid clause regex"));

/// `(file id, class name)` → relations.
#[derive(Debug, Default)]
pub struct RelationIndex {
    by_class: HashMap<(String, String), Relations>,
}

impl RelationIndex {
    pub fn build(files: &[FileSymbols]) -> Self {
        let mut idx = Self::default();
        for file in files {
            for sym in &file.symbols {
                idx.collect(sym);
            }
        }
        idx
    }

    fn collect(&mut self, sym: &Symbol) {
        if sym.kind == SymbolKind::Class && !sym.detail.is_empty() {
            let rel = parse_relations(&sym.detail);
            if !rel.is_empty() {
                self.by_class
                    .insert((sym.file_id.clone(), sym.name.clone()), rel);
            }
        }
        for child in &sym.children {
            self.collect(child);
        }
    }

    pub fn get(&self, file_id: &str, class_name: &str) -> Option<&Relations> {
        self.by_class
            .get(&(file_id.to_string(), strip_generics(class_name).to_string()))
    }

    pub fn len(&self) -> usize {
        self.by_class.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_class.is_empty()
    }
}

/// Parse the `extends` / `with` / `implements` clauses of a class header.
///
/// Each clause runs until the next clause keyword or the class body.
pub fn parse_relations(detail: &str) -> Relations {
    let header = detail.split('{').next().unwrap_or(detail);
    let clauses: Vec<_> = CLAUSE.captures_iter(header).collect();
    let mut rel = Relations::default();

    for (i, caps) in clauses.iter().enumerate() {
        let (Some(whole), Some(keyword)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let end = clauses
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(header.len(), |m| m.start());
        let names = split_top_level(&header[whole.end()..end]);

        match keyword.as_str() {
            "extends" => {
                if let Some(first) = names.into_iter().next() {
                    rel.extends = Some(first);
                }
            }
            "with" => rel.with.extend(names),
            "implements" => rel.implements.extend(names),
            // `mixin M on Base` constrains, it does not inherit
            _ => {}
        }
    }
    rel
}

/// Split on commas outside of `<...>`.
fn split_top_level(list: &str) -> Vec<RelationTarget> {
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut current = String::new();
    for ch in list.chars() {
        match ch {
            '<' => depth += 1,
            '>' => depth -= 1,
            ',' if depth == 0 => {
                push_name(&mut out, &current);
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(ch);
    }
    push_name(&mut out, &current);
    out
}

fn push_name(out: &mut Vec<RelationTarget>, raw: &str) {
    let name = raw.trim();
    if !name.is_empty() {
        out.push(RelationTarget::Name(name.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sym, with_detail};

    #[test]
    fn parses_each_clause() {
        let rel = parse_relations(
            "class Foo<T> extends Bar<T> with Loggable implements Api<Map<String, int>>, Disposable",
        );
        assert_eq!(rel.extends.as_ref().map(|t| t.name()), Some("Bar<T>"));
        assert_eq!(rel.with.iter().map(|t| t.name()).collect::<Vec<_>>(), ["Loggable"]);
        assert_eq!(
            rel.implements.iter().map(|t| t.name()).collect::<Vec<_>>(),
            ["Api<Map<String, int>>", "Disposable"]
        );
    }

    #[test]
    fn simple_extends() {
        let rel = parse_relations("extends StatelessWidget");
        assert_eq!(rel.names().collect::<Vec<_>>(), ["StatelessWidget"]);
    }

    #[test]
    fn index_is_keyed_by_file_and_name() {
        let file_id = "file:///lib/home.dart";
        let files = vec![FileSymbols {
            file_id: file_id.into(),
            text: String::new(),
            symbols: vec![with_detail(
                sym("Home", SymbolKind::Class, file_id, 0, 5),
                "extends StatelessWidget",
            )],
        }];
        let idx = RelationIndex::build(&files);
        assert_eq!(idx.len(), 1);
        assert!(idx.get(file_id, "Home<T>").is_some());
        assert!(idx.get("file:///lib/other.dart", "Home").is_none());
    }
}
