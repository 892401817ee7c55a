//! Types, parameters and return types parsed from the detail string.

use crate::{
    analysis::enrich::{EnrichEnv, SymbolEnricher, params::parse_parameters},
    model::{
        kind::SymbolKind,
        symbol::{ParsedParameter, SELF_FIELD_PREFIX, Symbol, TypeReference},
    },
};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static FIELD_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?:(?:@[\w.]+\s*)*(?:late|final|const|static|required|covariant)\s+)*([\w<>\[\]\{\},?().\s]+?)\s+[\w$]+\s*(?:=.*)?$",
    )
    .expect("valid field regex")
});
static ANNOTATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@[\w.]+\s*").expect("valid annotation regex"));
static MODIFIERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(static|external|async|sync|factory|late|final|const|required)\b\s*")
        .expect("valid modifier regex")
});
static BRACED_THIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\(\s*\{\s*this\.[\w$]+").expect("valid braced-this regex"));
static THIS_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"this\.([\w$]+)").expect("valid this regex"));

pub struct DetailTypes;

impl SymbolEnricher for DetailTypes {
    fn name(&self) -> &'static str {
        "detail"
    }

    fn applies(&self, sym: &Symbol, _env: &EnrichEnv<'_>) -> bool {
        !sym.detail.is_empty() && (sym.kind.is_field_like() || sym.kind.is_callable())
    }

    fn enrich(&self, sym: &mut Symbol, env: &EnrichEnv<'_>) {
        if sym.kind.is_field_like() {
            enrich_field(sym, env);
            return;
        }

        if sym.parameters.as_ref().is_none_or(|p| p.is_empty()) {
            if let Some(params) = parse_parameters(&sym.detail) {
                debug!(symbol = %sym.name, count = params.len(), "Parsed parameters from detail");
                sym.parameters = Some(params);
            }
        }

        if sym.kind == SymbolKind::Constructor {
            braced_this_fallback(sym);
        } else if sym.return_type.is_none() {
            if let Some(ret) = return_type_from_detail(&sym.detail, &sym.name) {
                sym.return_type_ref = Some(env.ctx.types.resolve(&ret));
                sym.return_type = Some(ret);
            }
        }

        let params = sym.parameters.get_or_insert_with(Vec::new);
        resolve_parameter_types(params, env);
    }
}

fn enrich_field(sym: &mut Symbol, env: &EnrichEnv<'_>) {
    if sym.resolved_type.is_some() {
        return;
    }
    if let Some(c) = FIELD_DECL.captures(&sym.detail) {
        let ty = c[1].trim().to_string();
        debug!(field = %sym.name, ty = %ty, "Field type from detail");
        sym.resolved_type_ref = Some(env.ctx.types.resolve(&ty));
        sym.resolved_type = Some(ty);
    }
}

/// Return type of `name` in `detail`, with annotations and modifiers removed.
/// `void` counts as no return type.
pub fn return_type_from_detail(detail: &str, name: &str) -> Option<String> {
    let without_annotations = ANNOTATION.replace_all(detail, "");
    let normalized = MODIFIERS.replace_all(&without_annotations, "");
    let pattern = format!(
        r"^([\w<>{{}}\[\]\s.,?()]+?)\s+{}\s*\(",
        regex::escape(name)
    );
    let re = Regex::new(&pattern).ok()?;
    let ret = re.captures(normalized.trim())?.get(1)?.as_str().trim().to_string();
    (!ret.eq_ignore_ascii_case("void")).then_some(ret)
}

/// `({this.a, this.b})` with nothing parsed: synthesize named placeholders.
fn braced_this_fallback(sym: &mut Symbol) {
    let empty = sym.parameters.as_ref().is_none_or(|p| p.is_empty());
    if !empty || !BRACED_THIS.is_match(&sym.detail) {
        return;
    }
    let params: Vec<ParsedParameter> = THIS_REF
        .captures_iter(&sym.detail)
        .map(|c| self_field_param(&c[1], true))
        .collect();
    if !params.is_empty() {
        debug!(ctor = %sym.name, count = params.len(), "Inferred this.field parameters");
        sym.parameters = Some(params);
    }
}

pub(crate) fn self_field_param(field: &str, named: bool) -> ParsedParameter {
    ParsedParameter {
        ty: format!("{SELF_FIELD_PREFIX}{field}"),
        name: Some(field.to_string()),
        is_named: named,
        is_required: false,
        is_optional_positional: false,
        type_ref: None,
    }
}

/// Placeholders get a reference carrying the placeholder until the closure pass.
pub(crate) fn resolve_parameter_types(params: &mut [ParsedParameter], env: &EnrichEnv<'_>) {
    for p in params.iter_mut().filter(|p| p.type_ref.is_none()) {
        p.type_ref = Some(if p.self_field().is_some() {
            TypeReference::unresolved(p.ty.clone())
        } else {
            env.ctx.types.resolve(&p.ty)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{analysis::context::AnalysisContext, model::symbol::FileSymbols, test_support::*};

    fn env(ctx: &AnalysisContext) -> EnrichEnv<'_> {
        EnrichEnv {
            ctx,
            text: "",
            container: Some("Widget"),
        }
    }

    #[test]
    fn method_signature() {
        let ctx = AnalysisContext::default();
        let mut m = with_detail(
            sym("compute", SymbolKind::Method, "file:///a.dart", 3, 6),
            "List<int> compute(int x, {String? name, required bool flag})",
        );
        DetailTypes.enrich(&mut m, &env(&ctx));

        assert_eq!(m.return_type.as_deref(), Some("List<int>"));
        let params = m.parameters.unwrap();
        assert_eq!(params.len(), 3);
        assert!(params.iter().all(|p| p.type_ref.is_some()));
        assert!(params[2].is_required);
    }

    #[test]
    fn void_and_modifiers() {
        assert_eq!(return_type_from_detail("void dispose()", "dispose"), None);
        assert_eq!(
            return_type_from_detail("@override static Future<User?> load(String id)", "load").as_deref(),
            Some("Future<User?>")
        );
    }

    #[test]
    fn field_type_with_modifiers() {
        let file_id = "file:///lib/card.dart";
        let mut ctx = AnalysisContext::default();
        ctx.prepare(&[FileSymbols {
            file_id: file_id.into(),
            text: String::new(),
            symbols: vec![sym("Palette", SymbolKind::Class, file_id, 0, 2)],
        }]);

        let mut f = with_detail(
            sym("palette", SymbolKind::Field, file_id, 4, 4),
            "@observable late final Palette palette",
        );
        DetailTypes.enrich(&mut f, &env(&ctx));
        assert_eq!(f.resolved_type.as_deref(), Some("Palette"));
        assert!(f.resolved_type_ref.unwrap().definition.is_some());
    }

    #[test]
    fn constructor_this_params_keep_placeholder_refs() {
        let ctx = AnalysisContext::default();
        let mut c = with_detail(
            sym("Card", SymbolKind::Constructor, "file:///a.dart", 1, 1),
            "({required this.color})",
        );
        DetailTypes.enrich(&mut c, &env(&ctx));

        let params = c.parameters.unwrap();
        assert_eq!(params[0].ty, "self_field:color");
        assert_eq!(params[0].type_ref.as_ref().unwrap().name, "self_field:color");
        assert!(c.return_type.is_none());
    }

    #[test]
    fn callables_always_end_with_a_parameter_list() {
        let ctx = AnalysisContext::default();
        let mut getter = with_detail(sym("count", SymbolKind::Method, "file:///a.dart", 1, 1), "int count");
        DetailTypes.enrich(&mut getter, &env(&ctx));
        assert_eq!(getter.parameters, Some(vec![]));
    }
}
