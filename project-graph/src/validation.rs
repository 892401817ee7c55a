//! Consistency checks over enriched trees and the finished graph.
//!
//! Nothing here fails a run: findings are logged and collected into a
//! [`ValidationReport`] that ships with the analysis output.

use crate::model::{
    graph::ProjectGraphModel,
    kind::SymbolKind,
    symbol::{FileSymbols, Symbol},
};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{error, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    pub fn merge(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    fn error(&mut self, msg: String) {
        error!("{msg}");
        self.errors.push(msg);
    }

    fn warn(&mut self, msg: String) {
        warn!("{msg}");
        self.warnings.push(msg);
    }
}

/// Parent links, constructor parameters and constructor ownership.
pub fn validate_enriched_data(files: &[FileSymbols]) -> ValidationReport {
    let mut report = ValidationReport::default();
    let mut seen: HashMap<&str, &Symbol> = HashMap::new();
    for file in files {
        for sym in &file.symbols {
            check_symbol(sym, &mut seen, &mut report);
        }
    }
    report
}

fn check_symbol<'a>(sym: &'a Symbol, seen: &mut HashMap<&'a str, &'a Symbol>, report: &mut ValidationReport) {
    seen.insert(sym.unique_id.as_str(), sym);

    if sym.kind == SymbolKind::Constructor && sym.parameters.is_none() && !sym.detail.is_empty() {
        report.warn(format!(
            "Constructor '{}' has detail but no parameters were extracted",
            sym.name
        ));
    }

    if let Some(parent_id) = sym.parent_id.as_deref() {
        match seen.get(parent_id) {
            None => report.error(format!(
                "parentId '{parent_id}' of '{}' is not a known symbol",
                sym.name
            )),
            Some(parent) if sym.kind == SymbolKind::Constructor => check_constructor(sym, parent, report),
            Some(_) => {}
        }
    }

    for child in &sym.children {
        check_symbol(child, seen, report);
    }
}

fn check_constructor(ctor: &Symbol, parent: &Symbol, report: &mut ValidationReport) {
    if parent.kind != SymbolKind::Class {
        report.error(format!(
            "Constructor '{}' belongs to '{}', which is not a class",
            ctor.name, parent.name
        ));
    }
    let members: HashSet<&str> = parent.children.iter().map(|c| c.name.as_str()).collect();
    for field in ctor.parameters.iter().flatten().filter_map(|p| p.self_field()) {
        if !members.contains(field) {
            report.warn(format!(
                "Constructor '{}' assigns this.{field}, which is not a member of '{}'",
                ctor.name, parent.name
            ));
        }
    }
}

/// Every edge endpoint and every parent reference must name an existing node.
pub fn validate_graph(graph: &ProjectGraphModel) -> ValidationReport {
    let mut report = ValidationReport::default();
    let ids: HashSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();

    for node in &graph.nodes {
        if let Some(parent) = node.parent.as_deref().filter(|p| !ids.contains(p)) {
            report.error(format!("Node '{}' has unknown parent '{parent}'", node.id));
        }
    }
    for edge in &graph.edges {
        for end in [&edge.source, &edge.target] {
            if !ids.contains(end.as_str()) {
                report.error(format!("Edge '{}' ({}) points at unknown node '{end}'", edge.id, edge.label));
            }
        }
    }
    report
}
