//! Naming helpers shared by enrichment and graph construction.
//!
//! - [`global_symbol_id`]: stable node id from (file, container, kind, name)
//! - [`parse_base_type_name`]: `List<app.User>?` → `User`
//! - [`strip_generics`]: `Repo<T>` → `Repo`

use crate::model::{kind::SymbolKind, symbol::Symbol};
use regex::Regex;
use std::sync::LazyLock;

static GENERIC_WRAPPER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w\s]+\s*<(.+)>$").expect("valid generic wrapper regex"));

/// File id used when a symbol carries none.
pub const UNKNOWN_FILE_ID: &str = "unknown_uri";

/// Name part used for a default constructor (one named after its class).
pub const DEFAULT_CTOR_NAME: &str = "_default_";

/// Global node id for `symbol`, optionally scoped by its enclosing container.
///
/// Pure function of (file id, container name, kind, name): visiting the same
/// symbol twice yields the same id.
pub fn global_symbol_id(symbol: &Symbol, container: Option<&str>) -> String {
    let file_id = if symbol.file_id.is_empty() {
        UNKNOWN_FILE_ID
    } else {
        symbol.file_id.as_str()
    };
    let prefix = symbol.kind.id_prefix();

    let name = match container {
        Some(parent) if symbol.kind == SymbolKind::Constructor && symbol.name == parent => {
            DEFAULT_CTOR_NAME
        }
        _ => symbol.name.as_str(),
    };

    match container {
        Some(parent) => format!("{file_id}#parent:{parent}#kind:{prefix}#name:{name}"),
        None => format!("{file_id}#kind:{prefix}#name:{name}"),
    }
}

/// Reduce a possibly generic, nullable, qualified type string to its base name.
///
/// Generic wrappers are unwrapped recursively, so `Future<List<User>>` yields
/// `User`. A qualified name keeps its last segment.
pub fn parse_base_type_name(type_name: &str) -> String {
    let mut clean = type_name.trim();
    if let Some(stripped) = clean.strip_suffix('?') {
        clean = stripped;
    }

    if let Some(caps) = GENERIC_WRAPPER.captures(clean) {
        let inner = parse_base_type_name(&caps[1]);
        if !inner.is_empty() {
            return inner;
        }
    }

    let last_segment = clean.rsplit('.').next().unwrap_or(clean);
    last_segment
        .rsplit(' ')
        .next()
        .unwrap_or(last_segment)
        .to_string()
}

/// SDK sources live under `.../dart-sdk/lib/...`.
pub fn is_sdk_file(file_id: &str) -> bool {
    file_id.contains("/dart-sdk/lib/")
}

/// Drop generic arguments: `Repo<User>` → `Repo`.
pub fn strip_generics(name: &str) -> &str {
    name.split('<').next().unwrap_or(name).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(name: &str, kind: SymbolKind) -> Symbol {
        Symbol::new(name, kind, "file:///lib/a.dart")
    }

    #[test]
    fn id_without_container() {
        let id = global_symbol_id(&sym("Home", SymbolKind::Class), None);
        assert_eq!(id, "file:///lib/a.dart#kind:class#name:Home");
    }

    #[test]
    fn id_with_container_and_default_ctor() {
        let id = global_symbol_id(&sym("Home", SymbolKind::Constructor), Some("Home"));
        assert_eq!(id, "file:///lib/a.dart#parent:Home#kind:ctor#name:_default_");

        let named = global_symbol_id(&sym("Home.empty", SymbolKind::Constructor), Some("Home"));
        assert!(named.ends_with("#kind:ctor#name:Home.empty"));
    }

    #[test]
    fn id_uses_placeholder_for_missing_file() {
        let s = Symbol::new("f", SymbolKind::Function, "");
        assert_eq!(global_symbol_id(&s, None), "unknown_uri#kind:func#name:f");
    }

    #[test]
    fn base_type_names() {
        assert_eq!(parse_base_type_name("String?"), "String");
        assert_eq!(parse_base_type_name("List<User>"), "User");
        assert_eq!(parse_base_type_name("Future<List<models.User>>"), "User");
        assert_eq!(parse_base_type_name(" app.Color "), "Color");
        assert_eq!(parse_base_type_name("Map<String, int>"), "int");
    }

    #[test]
    fn generics_stripped() {
        assert_eq!(strip_generics("Repo<User>"), "Repo");
        assert_eq!(strip_generics("Plain"), "Plain");
    }
}
