//! Hover fallback.
//!
//! The request is planned after detail parsing, only for symbols still
//! missing a field type, return type or constructor parameters. At most one
//! hover query is issued per symbol.

use crate::{
    analysis::enrich::{
        EnrichEnv, detail::{resolve_parameter_types, self_field_param}, needs_type_info,
    },
    lsp::LanguageService,
    model::{kind::SymbolKind, span::Position, symbol::Symbol},
};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

static THIS_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"this\.(\w+)").expect("valid this regex"));

/// A planned hover query, detached from the symbol it was planned for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverRequest {
    pub file_id: String,
    pub position: Position,
    pub name: String,
}

pub struct HoverTypes;

impl HoverTypes {
    /// Plan a query if the symbol needs type info and was never hovered.
    /// Marks the symbol as checked.
    pub fn plan(&self, sym: &mut Symbol, env: &EnrichEnv<'_>) -> Option<HoverRequest> {
        if !env.ctx.config.features.hover_fallback || sym.hover_checked || sym.file_id.is_empty() {
            return None;
        }
        let selection = sym.selection_range?;
        if !needs_type_info(sym) {
            return None;
        }
        sym.hover_checked = true;
        Some(HoverRequest {
            file_id: sym.file_id.clone(),
            position: selection.start,
            name: sym.name.clone(),
        })
    }

    /// Run the query. Failures are logged and read as "no data".
    pub async fn fetch(
        &self,
        service: &dyn LanguageService,
        request: Option<HoverRequest>,
    ) -> Option<(HoverRequest, String)> {
        let request = request?;
        match service.hover(&request.file_id, request.position).await {
            Ok(Some(info)) if !info.contents.trim().is_empty() => Some((request, info.contents)),
            Ok(_) => None,
            Err(err) => {
                warn!(symbol = %request.name, error = %err, "Hover query failed");
                None
            }
        }
    }

    /// Fill in whatever is still missing from the hover text.
    pub fn apply(&self, contents: &str, sym: &mut Symbol, env: &EnrichEnv<'_>) {
        match sym.kind {
            SymbolKind::Field | SymbolKind::Property if sym.resolved_type.is_none() => {
                if let Some(ty) = field_type_from_hover(contents, &sym.name) {
                    debug!(field = %sym.name, ty = %ty, "Field type from hover");
                    sym.resolved_type_ref = Some(env.ctx.types.resolve(&ty));
                    sym.resolved_type = Some(ty);
                }
            }
            SymbolKind::Method | SymbolKind::Function if sym.return_type.is_none() => {
                if let Some(ret) = return_type_from_hover(contents, &sym.name) {
                    debug!(method = %sym.name, ret = %ret, "Return type from hover");
                    sym.return_type_ref = Some(env.ctx.types.resolve(&ret));
                    sym.return_type = Some(ret);
                }
            }
            SymbolKind::Constructor if sym.parameters.as_ref().is_none_or(|p| p.is_empty()) => {
                let mut params: Vec<_> = THIS_REF
                    .captures_iter(contents)
                    .map(|c| self_field_param(&c[1], true))
                    .collect();
                if !params.is_empty() {
                    debug!(ctor = %sym.name, count = params.len(), "Parameters from hover");
                    resolve_parameter_types(&mut params, env);
                    sym.parameters = Some(params);
                }
            }
            _ => {}
        }
    }
}

fn field_type_from_hover(contents: &str, name: &str) -> Option<String> {
    let re = Regex::new(&format!(r"```dart\s*(?:[\w\s]+\s)?(.+?)\s+{}", regex::escape(name))).ok()?;
    let ty = re.captures(contents)?.get(1)?.as_str().trim().to_string();
    (!ty.is_empty()).then_some(ty)
}

fn return_type_from_hover(contents: &str, name: &str) -> Option<String> {
    let re = Regex::new(&format!(
        r#"```dart\s*(?:static\s+)?(.+?)\s+(?:get\s+)?["'`]?{}["'`]?\s*\("#,
        regex::escape(name)
    ))
    .ok()?;
    let ret = re.captures(contents)?.get(1)?.as_str().trim().to_string();
    (!ret.is_empty() && !ret.eq_ignore_ascii_case("void")).then_some(ret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{analysis::context::AnalysisContext, test_support::*};

    fn env(ctx: &AnalysisContext) -> EnrichEnv<'_> {
        EnrichEnv {
            ctx,
            text: "",
            container: None,
        }
    }

    #[test]
    fn extracts_types_from_code_block() {
        assert_eq!(
            field_type_from_hover("```dart\nfinal String title\n```", "title").as_deref(),
            Some("String")
        );
        assert_eq!(
            return_type_from_hover("```dart\nFuture<User> load(String id)\n```", "load").as_deref(),
            Some("Future<User>")
        );
        assert_eq!(return_type_from_hover("```dart\nvoid close()\n```", "close"), None);
    }

    #[test]
    fn plans_once() {
        let ctx = AnalysisContext::default();
        let mut f = sym("title", SymbolKind::Field, "file:///a.dart", 2, 2);
        assert!(HoverTypes.plan(&mut f, &env(&ctx)).is_some());
        assert!(f.hover_checked);
        assert!(HoverTypes.plan(&mut f, &env(&ctx)).is_none());
    }

    #[test]
    fn no_plan_when_nothing_is_missing() {
        let ctx = AnalysisContext::default();
        let mut f = sym("title", SymbolKind::Field, "file:///a.dart", 2, 2);
        f.resolved_type = Some("String".into());
        assert!(HoverTypes.plan(&mut f, &env(&ctx)).is_none());
        assert!(!f.hover_checked);

        let mut class = sym("A", SymbolKind::Class, "file:///a.dart", 0, 9);
        assert!(HoverTypes.plan(&mut class, &env(&ctx)).is_none());
    }

    #[tokio::test]
    async fn failures_are_absorbed() {
        let svc = CannedService {
            failing_hover: true,
            ..Default::default()
        };
        let request = HoverRequest {
            file_id: "file:///a.dart".into(),
            position: Position::new(1, 1),
            name: "x".into(),
        };
        assert!(HoverTypes.fetch(&svc, Some(request)).await.is_none());
        assert_eq!(svc.hover_count(), 1);
    }

    #[test]
    fn constructor_params_from_hover() {
        let ctx = AnalysisContext::default();
        let mut c = sym("Card", SymbolKind::Constructor, "file:///a.dart", 1, 1);
        HoverTypes.apply("```dart\nCard({this.color, this.size})\n```", &mut c, &env(&ctx));
        let params = c.parameters.unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params[1].ty, "self_field:size");
    }
}
