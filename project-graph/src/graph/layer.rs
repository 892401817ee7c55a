//! Architectural layer heuristics.
//!
//! [`classify`] walks [`RULES`] top to bottom and returns the layer of the
//! first rule that matches. Rules are grouped in tiers (view, state, service,
//! model, utility); tier order decides ties, so a `UserModel` extending
//! `StatelessWidget` is a view. Classes matching nothing are utilities.

use crate::{
    core::names::strip_generics,
    model::{
        graph::Layer,
        kind::SymbolKind,
        symbol::{Relations, Symbol},
    },
};

/// What the rules look at, normalized once per class.
pub struct ClassShape<'a> {
    symbol: &'a Symbol,
    /// Lower-cased class name.
    name: String,
    /// Lower-cased relation names without generic arguments.
    relations: Vec<String>,
}

impl<'a> ClassShape<'a> {
    pub fn new(symbol: &'a Symbol, relations: Option<&Relations>) -> Self {
        Self {
            symbol,
            name: symbol.name.to_lowercase(),
            relations: relations
                .map(|r| r.names().map(|n| strip_generics(n).trim().to_lowercase()).collect())
                .unwrap_or_default(),
        }
    }

    fn methods(&self) -> impl Iterator<Item = &'a Symbol> {
        self.symbol.children.iter().filter(|c| c.kind == SymbolKind::Method)
    }

    fn fields(&self) -> impl Iterator<Item = &'a Symbol> {
        self.symbol.children.iter().filter(|c| c.kind.is_field_like())
    }

    fn name_ends_with(&self, suffixes: &[&str]) -> bool {
        suffixes.iter().any(|s| self.name.ends_with(s))
    }

    fn name_contains(&self, parts: &[&str]) -> bool {
        parts.iter().any(|p| self.name.contains(p))
    }

    fn relation_is(&self, names: &[&str]) -> bool {
        self.relations.iter().any(|r| names.contains(&r.as_str()))
    }

    fn relation_contains(&self, parts: &[&str]) -> bool {
        self.relations.iter().any(|r| parts.iter().any(|p| r.contains(p)))
    }

    /// Share of methods satisfying `pred`; `None` without methods.
    fn method_ratio(&self, pred: impl Fn(&Symbol) -> bool) -> Option<f64> {
        let (total, hits) = self
            .methods()
            .fold((0usize, 0usize), |(t, h), m| (t + 1, h + usize::from(pred(m))));
        (total > 0).then(|| hits as f64 / total as f64)
    }
}

pub struct LayerRule {
    pub name: &'static str,
    pub layer: Layer,
    pub matches: fn(&ClassShape<'_>) -> bool,
}

const UI_BASES: &[&str] = &["statelesswidget", "statefulwidget", "hookwidget", "widget"];
const UI_RELATION_PARTS: &[&str] = &["widget", "component", "renderobject", "sliver"];
const VIEW_SUFFIXES: &[&str] = &[
    "page", "screen", "view", "widget", "dialog", "modal", "bottomsheet", "drawer",
];
const VIEW_PARTS: &[&str] = &["page", "screen", "widget", "dialog"];

const STATE_BASES: &[&str] = &[
    "changenotifier", "statenotifier", "bloc", "cubit", "provider", "controller",
];
const STATE_SUFFIXES: &[&str] = &[
    "bloc", "cubit", "provider", "controller", "notifier", "store", "reducer", "manager",
    "viewmodel",
];
const STATE_PARTS: &[&str] = &["bloc", "cubit", "provider", "controller", "notifier"];

const SERVICE_RELATION_PARTS: &[&str] = &["service", "repository", "client", "adapter", "gateway"];
const SERVICE_SUFFIXES: &[&str] = &[
    "service", "repository", "api", "datasource", "client", "gateway", "adapter", "helper",
    "handler",
];
const SERVICE_PARTS: &[&str] = &["service", "repository", "api", "client", "gateway", "adapter"];

const BOILERPLATE_METHODS: &[&str] = &[
    "tostring", "hashcode", "operator==", "copywith", "tojson", "fromjson",
];
const MODEL_SUFFIXES: &[&str] = &[
    "model", "entity", "dto", "data", "response", "request", "event", "state", "vo", "pojo",
];
const MODEL_PARTS: &[&str] = &["model", "entity", "dto", "data"];

const UTILITY_SUFFIXES: &[&str] = &[
    "util", "utils", "helper", "extension", "mixin", "constants", "config", "settings",
];

pub static RULES: &[LayerRule] = &[
    LayerRule {
        name: "ui-base-type",
        layer: Layer::View,
        matches: |c| c.relation_is(UI_BASES),
    },
    LayerRule {
        name: "build-method",
        layer: Layer::View,
        matches: |c| c.methods().any(is_build_method),
    },
    LayerRule {
        name: "ui-relation",
        layer: Layer::View,
        matches: |c| c.relation_contains(UI_RELATION_PARTS),
    },
    LayerRule {
        name: "view-name",
        layer: Layer::View,
        matches: |c| c.name_ends_with(VIEW_SUFFIXES) || c.name_contains(VIEW_PARTS),
    },
    LayerRule {
        name: "state-base-type",
        layer: Layer::State,
        matches: |c| c.relation_is(STATE_BASES),
    },
    LayerRule {
        name: "state-stream",
        layer: Layer::State,
        matches: |c| {
            c.fields().any(|f| f.name == "stream" || f.name == "state")
                && c.methods().any(|m| matches!(m.name.as_str(), "add" | "emit" | "on"))
        },
    },
    LayerRule {
        name: "state-name",
        layer: Layer::State,
        matches: |c| c.name_ends_with(STATE_SUFFIXES) || c.name_contains(STATE_PARTS),
    },
    LayerRule {
        name: "async-methods",
        layer: Layer::Service,
        matches: |c| c.method_ratio(is_async_method).is_some_and(|r| r >= 0.5),
    },
    LayerRule {
        name: "service-relation",
        layer: Layer::Service,
        matches: |c| c.relation_contains(SERVICE_RELATION_PARTS),
    },
    LayerRule {
        name: "service-name",
        layer: Layer::Service,
        matches: |c| c.name_ends_with(SERVICE_SUFFIXES) || c.name_contains(SERVICE_PARTS),
    },
    LayerRule {
        name: "data-shape",
        layer: Layer::Model,
        matches: |c| {
            c.symbol.kind == SymbolKind::Class
                && c.fields().next().is_some()
                && c.methods()
                    .filter(|m| !BOILERPLATE_METHODS.contains(&m.name.to_lowercase().as_str()))
                    .count()
                    <= 2
        },
    },
    LayerRule {
        name: "model-name",
        layer: Layer::Model,
        matches: |c| {
            c.name_ends_with(MODEL_SUFFIXES)
                || c.name_contains(MODEL_PARTS)
                || c.relation_contains(MODEL_PARTS)
        },
    },
    LayerRule {
        name: "enum",
        layer: Layer::Model,
        matches: |c| c.symbol.kind == SymbolKind::Enum,
    },
    LayerRule {
        name: "utility-name",
        layer: Layer::Utility,
        matches: |c| c.name_ends_with(UTILITY_SUFFIXES),
    },
    LayerRule {
        name: "static-methods",
        layer: Layer::Utility,
        matches: |c| {
            c.method_ratio(|m| m.detail.to_lowercase().contains("static"))
                .is_some_and(|r| r >= 0.7)
        },
    },
];

/// `build()` or `build(BuildContext context)`.
fn is_build_method(m: &Symbol) -> bool {
    m.name == "build"
        && match m.parameters.as_deref() {
            None | Some([]) => true,
            Some([only]) => strip_generics(&only.ty).trim() == "BuildContext",
            Some(_) => false,
        }
}

fn is_async_method(m: &Symbol) -> bool {
    let ret = m.return_type.as_deref().unwrap_or_default().to_lowercase();
    ret.contains("future") || ret.contains("stream") || m.name.to_lowercase().contains("async")
}

/// First matching rule, if any. Only classes and enums are considered.
pub fn matching_rule(symbol: &Symbol, relations: Option<&Relations>) -> Option<&'static LayerRule> {
    if !matches!(symbol.kind, SymbolKind::Class | SymbolKind::Enum) {
        return None;
    }
    let shape = ClassShape::new(symbol, relations);
    RULES.iter().find(|rule| (rule.matches)(&shape))
}

/// Layer of `symbol`. Pure: identical inputs give identical layers.
pub fn classify(symbol: &Symbol, relations: Option<&Relations>) -> Layer {
    if !matches!(symbol.kind, SymbolKind::Class | SymbolKind::Enum) {
        return Layer::Member;
    }
    matching_rule(symbol, relations).map_or(Layer::Utility, |rule| rule.layer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::symbol::{ParsedParameter, RelationTarget},
        test_support::*,
    };

    const FILE: &str = "file:///lib/app.dart";

    fn class(name: &str) -> Symbol {
        sym(name, SymbolKind::Class, FILE, 0, 20)
    }

    fn extends(base: &str) -> Relations {
        Relations {
            extends: Some(RelationTarget::Name(base.into())),
            ..Default::default()
        }
    }

    #[test]
    fn members_are_never_classified() {
        let m = sym("build", SymbolKind::Method, FILE, 1, 2);
        assert_eq!(classify(&m, None), Layer::Member);
    }

    #[test]
    fn repository_is_a_service_and_classification_is_stable() {
        let repo = class("UserRepository");
        assert_eq!(classify(&repo, None), Layer::Service);
        assert_eq!(classify(&repo, None), classify(&repo, None));
        assert_eq!(matching_rule(&repo, None).map(|r| r.name), Some("service-name"));
    }

    #[test]
    fn ui_base_wins_over_model_name() {
        let rel = extends("StatelessWidget");
        assert_eq!(classify(&class("UserModel"), Some(&rel)), Layer::View);
        assert_eq!(classify(&class("UserModel"), None), Layer::Model);
    }

    #[test]
    fn build_method_with_context_is_a_view() {
        let mut build = sym("build", SymbolKind::Method, FILE, 2, 4);
        build.parameters = Some(vec![ParsedParameter {
            ty: "BuildContext".into(),
            name: Some("context".into()),
            ..Default::default()
        }]);
        let shell = with_children(class("Shell"), vec![build]);
        assert_eq!(classify(&shell, None), Layer::View);
    }

    #[test]
    fn bloc_shape_is_state() {
        let bloc = with_children(
            class("Counter"),
            vec![
                sym("state", SymbolKind::Field, FILE, 1, 1),
                sym("emit", SymbolKind::Method, FILE, 2, 3),
                sym("reset", SymbolKind::Method, FILE, 4, 5),
                sym("increment", SymbolKind::Method, FILE, 6, 7),
            ],
        );
        assert_eq!(classify(&bloc, None), Layer::State);
        assert_eq!(classify(&class("LoginState"), None), Layer::Model);
    }

    #[test]
    fn async_heavy_classes_are_services() {
        let mut fetch = sym("fetch", SymbolKind::Method, FILE, 1, 2);
        fetch.return_type = Some("Future<List<Item>>".into());
        let sync = sym("count", SymbolKind::Method, FILE, 3, 4);
        let feed = with_children(class("Feed"), vec![fetch, sync]);
        assert_eq!(classify(&feed, None), Layer::Service);
    }

    #[test]
    fn enums_are_models_and_static_bags_are_utilities() {
        let e = sym("Status", SymbolKind::Enum, FILE, 0, 3);
        assert_eq!(classify(&e, None), Layer::Model);

        let statics: Vec<_> = (0..3)
            .map(|i| with_detail(sym(&format!("m{i}"), SymbolKind::Method, FILE, i, i), "static int m()"))
            .collect();
        assert_eq!(classify(&with_children(class("Maths"), statics), None), Layer::Utility);
        assert_eq!(classify(&class("Zebra"), None), Layer::Utility);
    }
}
