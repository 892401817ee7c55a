//! Raw descriptor → [`Symbol`] conversion (1:1, recursive).

use crate::model::{
    kind::SymbolKind,
    symbol::{RawSymbol, Symbol},
};

/// Convert a file's raw forest. Children get their parent's `unique_id` as
/// `parent_id`; a missing detail becomes the empty string.
pub fn transform_raw_symbols(raw: &[RawSymbol], file_id: &str) -> Vec<Symbol> {
    raw.iter().map(|r| transform_one(r, file_id, None)).collect()
}

fn transform_one(raw: &RawSymbol, file_id: &str, parent_id: Option<&str>) -> Symbol {
    let mut sym = Symbol::new(raw.name.clone(), SymbolKind::from_code(raw.kind), file_id);
    sym.detail = raw.detail.clone().unwrap_or_default();
    sym.range = raw.range;
    sym.selection_range = raw.selection_range;
    sym.parent_id = parent_id.map(str::to_string);

    let own_id = sym.unique_id.clone();
    sym.children = raw
        .children
        .iter()
        .map(|c| transform_one(c, file_id, Some(&own_id)))
        .collect();
    sym
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_ids_and_parent_links() {
        let raw = vec![RawSymbol {
            name: "Counter".into(),
            kind: 5,
            detail: None,
            range: None,
            selection_range: None,
            children: vec![RawSymbol {
                name: "increment".into(),
                kind: 6,
                detail: Some("void increment()".into()),
                ..Default::default()
            }],
        }];

        let out = transform_raw_symbols(&raw, "file:///lib/counter.dart");
        let class = &out[0];
        assert_eq!(class.unique_id, "file:///lib/counter.dart#Counter#5");
        assert_eq!(class.kind, SymbolKind::Class);
        assert_eq!(class.detail, "");
        assert!(class.parent_id.is_none());

        let method = &class.children[0];
        assert_eq!(method.kind, SymbolKind::Method);
        assert_eq!(method.parent_id.as_deref(), Some("file:///lib/counter.dart#Counter#5"));
        assert_eq!(method.file_id, "file:///lib/counter.dart");
    }
}
