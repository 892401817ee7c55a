//! Edge pass: inheritance, calls and field reads.
//!
//! Calls are found by name only: every identifier followed by `(` in a
//! callable's cleaned body is looked up in the project-wide name index, so two
//! unrelated `update` methods both receive an edge from any caller of
//! `update(`. A dotted `Type.member(` is looked up both whole (named
//! constructors are reported as `Type.member`) and by its last segment.
//! Non-callable targets become READS_FROM candidates, confirmed by asking the
//! language service for references that sit inside the caller.

use crate::{
    core::{names::strip_generics, text::strip_comments_and_strings},
    graph::builder::GraphBuilder,
    lsp::{LanguageService, Location},
    model::{graph::EdgeLabel, symbol::RelationTarget},
};
use regex::Regex;
use std::{
    collections::{BTreeSet, HashMap},
    sync::LazyLock,
};
use tracing::{debug, info, warn};

static CALL_SITE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z_$][\w$]*)(?:\.([A-Za-z_$][\w$]*))?\s*\(").expect("valid call-site regex")
});

/// Names a call site may refer to: `name`, or `Type.member` and `member`.
fn call_site_names(text: &str) -> Vec<String> {
    let mut names = Vec::new();
    for c in CALL_SITE.captures_iter(text) {
        match c.get(2) {
            Some(member) => {
                names.push(format!("{}.{}", &c[1], member.as_str()));
                names.push(member.as_str().to_string());
            }
            None => names.push(c[1].to_string()),
        }
    }
    names
}

const CALLABLE_KINDS: &[&str] = &["method", "function", "constructor"];
const CALL_TARGET_KINDS: &[&str] = &["method", "function"];

impl GraphBuilder<'_> {
    #[tracing::instrument(level = "info", skip_all, fields(nodes = self.visit_order.len()))]
    pub async fn add_edges(&mut self, service: &dyn LanguageService, reads_from: bool) {
        let before = self.graph.edges.len();
        self.add_inheritance_edges();
        self.add_call_edges(service, reads_from).await;
        info!(created = self.graph.edges.len() - before, "Edges built");
    }

    /// EXTENDS / IMPLEMENTS against class nodes, matched by exact label.
    pub fn add_inheritance_edges(&mut self) {
        let mut planned = Vec::new();
        for id in &self.visit_order {
            let Some(relations) = self.symbols.get(id).and_then(|s| s.symbol.relations.as_ref()) else {
                continue;
            };
            let targets = relations
                .extends
                .iter()
                .map(|t| (t, EdgeLabel::Extends))
                .chain(relations.implements.iter().map(|t| (t, EdgeLabel::Implements)));
            for (target, label) in targets {
                if let Some(class_id) = self.class_node_named(target) {
                    planned.push((id.clone(), class_id, label));
                }
            }
        }
        for (source, target, label) in planned {
            self.create_edge(&source, &target, label);
        }
    }

    fn class_node_named(&self, target: &RelationTarget) -> Option<String> {
        let base = strip_generics(target.name());
        self.graph
            .nodes
            .iter()
            .find(|n| n.kind == "class" && n.label == base)
            .map(|n| n.id.clone())
    }

    async fn add_call_edges(&mut self, service: &dyn LanguageService, reads_from: bool) {
        let name_index = self.name_index();
        let sources: Vec<String> = self
            .visit_order
            .iter()
            .filter(|id| self.node(id).is_some_and(|n| CALLABLE_KINDS.contains(&n.kind.as_str())))
            .cloned()
            .collect();

        for source_id in sources {
            let Some(source) = self.symbols.get(&source_id).copied() else {
                continue;
            };
            let Some(range) = source.symbol.range else {
                continue;
            };
            let body = range.slice(source.text);
            if body.is_empty() {
                continue;
            }
            let cleaned = strip_comments_and_strings(body);
            let mentioned: BTreeSet<String> = call_site_names(&cleaned)
                .into_iter()
                .filter(|name| name_index.contains_key(name))
                .collect();
            debug!(source = %source.symbol.name, ?mentioned, "Call sites");

            for name in &mentioned {
                for target_id in &name_index[name] {
                    if *target_id == source_id {
                        continue;
                    }
                    let is_call = self
                        .node(target_id)
                        .is_some_and(|n| CALL_TARGET_KINDS.contains(&n.kind.as_str()));
                    if is_call {
                        self.create_edge(&source_id, target_id, EdgeLabel::Calls);
                    } else if reads_from {
                        self.try_reads_from(service, &source_id, target_id).await;
                    }
                }
            }
        }
    }

    /// Symbol name → node ids, in visit order.
    fn name_index(&self) -> HashMap<String, Vec<String>> {
        let mut index: HashMap<String, Vec<String>> = HashMap::new();
        for id in &self.visit_order {
            if let Some(s) = self.symbols.get(id) {
                index.entry(s.symbol.name.clone()).or_default().push(id.clone());
            }
        }
        index
    }

    /// READS_FROM `source → target` if any reference to the target lies in a
    /// method or function whose node is `source`. First hit wins.
    async fn try_reads_from(&mut self, service: &dyn LanguageService, source_id: &str, target_id: &str) {
        let Some(target) = self.symbols.get(target_id).map(|s| s.symbol) else {
            return;
        };
        let Some(selection) = target.selection_range else {
            return;
        };
        let references = match service.references(&target.file_id, selection.start).await {
            Ok(refs) => refs,
            Err(err) => {
                warn!(target = %target.name, error = %err, "Reference query failed");
                return;
            }
        };
        if references.is_empty() {
            debug!(target = %target.name, "No references");
            return;
        }

        let hit = references
            .iter()
            .any(|r| self.enclosing_callable(r).is_some_and(|id| id == source_id));
        if hit {
            debug!(%source_id, target = %target.name, "READS_FROM confirmed");
            self.create_edge(source_id, target_id, EdgeLabel::ReadsFrom);
        }
    }

    /// First method/function node of the reference's file whose range spans
    /// the reference's line.
    fn enclosing_callable(&self, reference: &Location) -> Option<&str> {
        let line = reference.range.start.line;
        self.graph
            .nodes
            .iter()
            .find(|n| {
                n.data.file_id == reference.file_id
                    && CALL_TARGET_KINDS.contains(&n.kind.as_str())
                    && n.data.range.is_some_and(|r| r.contains_line(line))
            })
            .map(|n| n.id.as_str())
    }
}
