use crate::{
    analysis::enrich::{EnrichEnv, SymbolEnricher},
    core::text::line_window,
    model::{kind::SymbolKind, symbol::Symbol},
};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static ANNOTATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@\w+(\([^)]*\))?").expect("valid annotation regex"));
static LEADING_MODIFIERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:late|final|const|static|external|covariant|required|var)(?:\s+|$))+")
        .expect("valid modifier regex")
});

/// Last resort: scan the lines just above (and including) the declaration
/// for `<type> name ;|=` or `<type> [get] name (`. The type must sit on the
/// same line as the name. Never overrides a type.
pub struct SourceRegex;

impl SymbolEnricher for SourceRegex {
    fn name(&self) -> &'static str {
        "source-regex"
    }

    fn applies(&self, sym: &Symbol, env: &EnrichEnv<'_>) -> bool {
        if !env.ctx.config.features.regex_fallback
            || env.text.is_empty()
            || sym.selection_range.is_none()
        {
            return false;
        }
        match sym.kind {
            SymbolKind::Field | SymbolKind::Property => sym.resolved_type.is_none(),
            SymbolKind::Method | SymbolKind::Function => sym.return_type.is_none(),
            _ => false,
        }
    }

    fn enrich(&self, sym: &mut Symbol, env: &EnrichEnv<'_>) {
        let Some(selection) = sym.selection_range else {
            return;
        };
        let line = selection.start.line as usize;
        let window = env.ctx.config.limits.regex_window_lines;
        let snippet = line_window(env.text, line.saturating_sub(window), line + 1);
        let name = regex::escape(&sym.name);

        if sym.kind.is_field_like() {
            let pattern = format!(r"(?:@\w+(\([^)]*\))?\s*)*(?:\w+\s+)*(.+?)[ \t]+{name}\s*(?:;|=)");
            if let Some(ty) = capture_type(&pattern, &snippet) {
                debug!(field = %sym.name, ty = %ty, "Field type from source");
                sym.resolved_type_ref = Some(env.ctx.types.resolve(&ty));
                sym.resolved_type = Some(ty);
            }
        } else {
            let pattern = format!(
                r"(?:@\w+(\([^)]*\))?\s*)*(?:static\s+)?(?:\w+\s+)*(.+?)[ \t]+(?:get[ \t]+)?{name}\s*\("
            );
            match capture_type(&pattern, &snippet) {
                Some(ret) if !ret.eq_ignore_ascii_case("void") => {
                    debug!(method = %sym.name, ret = %ret, "Return type from source");
                    sym.return_type_ref = Some(env.ctx.types.resolve(&ret));
                    sym.return_type = Some(ret);
                }
                _ => debug!(symbol = %sym.name, "No return type in source window"),
            }
        }
    }
}

fn capture_type(pattern: &str, snippet: &str) -> Option<String> {
    let re = Regex::new(pattern).ok()?;
    let raw = re.captures(snippet)?.get(2)?.as_str();
    let without_annotations = ANNOTATION.replace_all(raw, "");
    let ty = LEADING_MODIFIERS
        .replace(without_annotations.trim(), "")
        .trim()
        .to_string();
    (!ty.is_empty()).then_some(ty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{analysis::context::AnalysisContext, test_support::sym};

    const SRC: &str = "class Cart {\n  @observable\n  final Map<String, int> items = {};\n\n  static Future<bool> checkout(String id) async {\n  }\n  void clear() {}\n}\n";

    fn env<'a>(ctx: &'a AnalysisContext) -> EnrichEnv<'a> {
        EnrichEnv {
            ctx,
            text: SRC,
            container: Some("Cart"),
        }
    }

    #[test]
    fn field_type_from_declaration_line() {
        let ctx = AnalysisContext::default();
        let mut items = sym("items", SymbolKind::Field, "file:///cart.dart", 2, 2);
        assert!(SourceRegex.applies(&items, &env(&ctx)));
        SourceRegex.enrich(&mut items, &env(&ctx));
        assert_eq!(items.resolved_type.as_deref(), Some("Map<String, int>"));
    }

    #[test]
    fn return_type_and_void() {
        let ctx = AnalysisContext::default();
        let mut checkout = sym("checkout", SymbolKind::Method, "file:///cart.dart", 4, 5);
        SourceRegex.enrich(&mut checkout, &env(&ctx));
        assert_eq!(checkout.return_type.as_deref(), Some("Future<bool>"));

        let mut clear = sym("clear", SymbolKind::Method, "file:///cart.dart", 6, 6);
        SourceRegex.enrich(&mut clear, &env(&ctx));
        assert!(clear.return_type.is_none());
    }

    #[test]
    fn untyped_method_does_not_borrow_the_previous_line() {
        let ctx = AnalysisContext::default();
        let text = "class Profile {\n  Profile(this.avatar);\n  load() {}\n}\n";
        let env = EnrichEnv {
            ctx: &ctx,
            text,
            container: Some("Profile"),
        };
        let mut load = sym("load", SymbolKind::Method, "file:///profile.dart", 2, 2);
        assert!(SourceRegex.applies(&load, &env));
        SourceRegex.enrich(&mut load, &env);
        assert!(load.return_type.is_none());
    }

    #[test]
    fn resolved_types_are_left_alone() {
        let ctx = AnalysisContext::default();
        let mut items = sym("items", SymbolKind::Field, "file:///cart.dart", 2, 2);
        items.resolved_type = Some("Inventory".into());
        assert!(!SourceRegex.applies(&items, &env(&ctx)));
    }
}
