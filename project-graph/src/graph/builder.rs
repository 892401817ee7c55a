//! Graph construction state.
//!
//! [`GraphBuilder`] owns the node/edge arrays plus the bookkeeping that keeps
//! them consistent:
//! - `node_ids`: every generated node id; edges are only created between ids in here
//! - `symbols`: node id → the symbol (and file text) it was built from, covering
//!   every visited symbol even when its node already existed
//! - `edge_keys`: `(source, target, label)` triples already emitted
//!
//! Passes run sequentially and are the only writers.

use crate::{
    core::names::{UNKNOWN_FILE_ID, global_symbol_id},
    graph::layer::classify,
    model::{
        graph::{EdgeLabel, NodeData, ProjectGraphEdge, ProjectGraphModel, ProjectGraphNode},
        symbol::{FileSymbols, Symbol},
    },
};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// A visited symbol together with the text of its file.
#[derive(Clone, Copy)]
pub struct SymbolRef<'a> {
    pub symbol: &'a Symbol,
    pub text: &'a str,
}

#[derive(Default)]
pub struct GraphBuilder<'a> {
    pub(super) graph: ProjectGraphModel,
    pub(super) node_ids: HashSet<String>,
    /// node id → position in `graph.nodes`.
    pub(super) positions: HashMap<String, usize>,
    pub(super) symbols: HashMap<String, SymbolRef<'a>>,
    /// Node ids in first-visit order, for a deterministic edge pass.
    pub(super) visit_order: Vec<String>,
    edge_keys: HashSet<(String, String, EdgeLabel)>,
    next_edge: usize,
}

/// Nearest enclosing container while walking a forest.
#[derive(Clone, Copy)]
struct Scope<'s> {
    name: &'s str,
    node_id: &'s str,
}

impl<'a> GraphBuilder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Node pass over a set of files. Revisiting a symbol never creates a
    /// second node but refreshes its index entry.
    #[tracing::instrument(level = "info", skip_all, fields(files = files.len()))]
    pub fn add_files(&mut self, files: &'a [FileSymbols]) {
        let before = self.graph.nodes.len();
        for file in files {
            for sym in &file.symbols {
                self.add_symbol(sym, file, None);
            }
        }
        info!(created = self.graph.nodes.len() - before, total = self.graph.nodes.len(), "Nodes built");
    }

    fn add_symbol(&mut self, sym: &'a Symbol, file: &'a FileSymbols, scope: Option<Scope<'_>>) {
        let node_id = global_symbol_id(sym, scope.map(|s| s.name));

        if self.node_ids.insert(node_id.clone()) {
            let file_id = [sym.file_id.as_str(), file.file_id.as_str()]
                .into_iter()
                .find(|id| !id.is_empty())
                .unwrap_or(UNKNOWN_FILE_ID);
            let layer = classify(sym, sym.relations.as_ref());
            debug!(node = %node_id, %layer, parent = ?scope.map(|s| s.node_id), "Node");

            self.positions.insert(node_id.clone(), self.graph.nodes.len());
            self.visit_order.push(node_id.clone());
            self.graph.nodes.push(ProjectGraphNode {
                id: node_id.clone(),
                label: sym.name.clone(),
                kind: sym.kind.as_str(),
                data: NodeData {
                    file_id: file_id.to_string(),
                    range: sym.range,
                    selection_range: sym.selection_range,
                    access: sym.access,
                    is_sdk: sym.is_sdk,
                    layer,
                    source: None,
                },
                parent: scope.map(|s| s.node_id.to_string()),
                in_degree: 0,
                out_degree: 0,
            });
        }

        self.symbols.insert(
            node_id.clone(),
            SymbolRef {
                symbol: sym,
                text: &file.text,
            },
        );

        let next = if sym.is_container() {
            Some(Scope {
                name: &sym.name,
                node_id: &node_id,
            })
        } else {
            scope
        };
        for child in &sym.children {
            self.add_symbol(child, file, next);
        }
    }

    /// Add a synthetic node (package or project container). `false` if the id exists.
    pub fn add_node(&mut self, node: ProjectGraphNode) -> bool {
        if !self.node_ids.insert(node.id.clone()) {
            return false;
        }
        self.positions.insert(node.id.clone(), self.graph.nodes.len());
        self.graph.nodes.push(node);
        true
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.node_ids.contains(id)
    }

    pub fn node(&self, id: &str) -> Option<&ProjectGraphNode> {
        self.positions.get(id).map(|&i| &self.graph.nodes[i])
    }

    /// Emit an edge if both endpoints exist, differ, and the triple is new.
    pub fn create_edge(&mut self, source: &str, target: &str, label: EdgeLabel) -> bool {
        if source.is_empty() || source == target || !self.has_node(source) || !self.has_node(target) {
            return false;
        }
        if !self
            .edge_keys
            .insert((source.to_string(), target.to_string(), label))
        {
            return false;
        }
        debug!(%source, %target, %label, "Edge");
        self.graph.edges.push(ProjectGraphEdge {
            id: format!("e{}", self.next_edge),
            source: source.to_string(),
            target: target.to_string(),
            label,
        });
        self.next_edge += 1;
        true
    }

    pub fn graph(&self) -> &ProjectGraphModel {
        &self.graph
    }

    pub fn finish(self) -> ProjectGraphModel {
        self.graph
    }
}
