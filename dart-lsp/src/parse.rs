//! Decoding of LSP result payloads into pipeline types.

use project_graph::{
    lsp::{HoverInfo, Location},
    model::{span::Range, symbol::RawSymbol},
};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// Flat `SymbolInformation`, sent by servers without hierarchical support.
#[derive(Debug, Deserialize)]
struct SymbolInformation {
    name: String,
    kind: u32,
    location: WireLocation,
}

#[derive(Debug, Deserialize)]
struct WireLocation {
    uri: String,
    range: Range,
}

/// `textDocument/documentSymbol` result. Accepts both the hierarchical
/// `DocumentSymbol[]` and the flat `SymbolInformation[]` forms; entries that
/// fit neither are skipped.
pub fn document_symbols(result: Value) -> Vec<RawSymbol> {
    let Value::Array(items) = result else {
        return Vec::new();
    };
    items
        .into_iter()
        .filter_map(|item| {
            if item.get("location").is_some() {
                serde_json::from_value::<SymbolInformation>(item)
                    .ok()
                    .map(|info| RawSymbol {
                        name: info.name,
                        kind: info.kind,
                        range: Some(info.location.range),
                        ..Default::default()
                    })
            } else {
                serde_json::from_value::<RawSymbol>(item)
                    .inspect_err(|e| debug!(error = %e, "Skipping malformed document symbol"))
                    .ok()
            }
        })
        .collect()
}

/// `textDocument/hover` result flattened to text. Empty contents count as
/// no hover.
pub fn hover(result: Value) -> Option<HoverInfo> {
    let contents = result.get("contents")?;
    let text = match contents {
        Value::Array(parts) => parts.iter().filter_map(marked_text).collect::<Vec<_>>().join("\n"),
        other => marked_text(other)?,
    };
    let text = text.trim();
    (!text.is_empty()).then(|| HoverInfo {
        contents: text.to_string(),
    })
}

/// `MarkupContent`, `MarkedString` or `{ language, value }`.
fn marked_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map.get("value").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

/// `textDocument/references` result.
pub fn locations(result: Value) -> Vec<Location> {
    let Value::Array(items) = result else {
        return Vec::new();
    };
    items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<WireLocation>(item).ok())
        .map(|loc| Location {
            file_id: loc.uri,
            range: loc.range,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn range(l0: u32, l1: u32) -> Value {
        json!({ "start": { "line": l0, "character": 0 }, "end": { "line": l1, "character": 1 } })
    }

    #[test]
    fn hierarchical_symbols_keep_children() {
        let syms = document_symbols(json!([{
            "name": "Cart",
            "kind": 5,
            "detail": "class Cart",
            "range": range(0, 9),
            "selectionRange": range(0, 0),
            "children": [
                { "name": "items", "kind": 8, "detail": "List<Item>", "range": range(1, 1), "selectionRange": range(1, 1) }
            ]
        }]));
        assert_eq!(syms.len(), 1);
        assert_eq!(syms[0].children[0].name, "items");
        assert_eq!(syms[0].selection_range.map(|r| r.start.line), Some(0));
    }

    #[test]
    fn flat_symbols_use_location_range() {
        let syms = document_symbols(json!([{
            "name": "main",
            "kind": 12,
            "location": { "uri": "file:///a.dart", "range": range(3, 5) }
        }]));
        assert_eq!(syms[0].name, "main");
        assert_eq!(syms[0].range.map(|r| r.end.line), Some(5));
        assert!(syms[0].selection_range.is_none());
        assert!(document_symbols(Value::Null).is_empty());
    }

    #[test]
    fn hover_shapes_flatten_to_text() {
        let markup = hover(json!({ "contents": { "kind": "markdown", "value": "```dart\nint count\n```" } }));
        assert_eq!(markup.unwrap().contents, "```dart\nint count\n```");

        let marked = hover(json!({ "contents": ["String get name", { "language": "dart", "value": "x" }] }));
        assert_eq!(marked.unwrap().contents, "String get name\nx");

        assert!(hover(json!({ "contents": "" })).is_none());
        assert!(hover(Value::Null).is_none());
    }

    #[test]
    fn references_become_locations() {
        let locs = locations(json!([
            { "uri": "file:///a.dart", "range": range(4, 4) },
            { "bogus": true }
        ]));
        assert_eq!(locs.len(), 1);
        assert_eq!(locs[0].file_id, "file:///a.dart");
        assert_eq!(locs[0].range.start.line, 4);
    }
}
