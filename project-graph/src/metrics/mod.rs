//! Post-build graph metrics.

use crate::model::graph::{EdgeLabel, ProjectGraphModel};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use tracing::info;

/// Recompute `in_degree` / `out_degree` of every node from the edge list.
pub fn calculate_node_degrees(graph: &mut ProjectGraphModel) {
    let positions: HashMap<String, usize> = graph
        .nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.clone(), i))
        .collect();
    for node in &mut graph.nodes {
        node.in_degree = 0;
        node.out_degree = 0;
    }
    for edge in &graph.edges {
        if let Some(&i) = positions.get(&edge.source) {
            graph.nodes[i].out_degree += 1;
        }
        if let Some(&i) = positions.get(&edge.target) {
            graph.nodes[i].in_degree += 1;
        }
    }
}

/// Linear data-flow path through `start`: writers (WRITES_TO, followed
/// backwards) are prepended, readers (READS_FROM, followed forwards) appended.
/// At most `max_hops` steps per direction; a node never appears twice.
pub fn trace_data_flow(graph: &ProjectGraphModel, start: &str, max_hops: usize) -> Vec<String> {
    let mut path = VecDeque::from([start.to_string()]);
    let mut visited: HashSet<&str> = HashSet::from([start]);

    let mut current = start;
    for _ in 0..max_hops {
        let Some(writer) = graph
            .edges
            .iter()
            .find(|e| e.target == current && e.label == EdgeLabel::WritesTo && !visited.contains(e.source.as_str()))
        else {
            break;
        };
        visited.insert(&writer.source);
        path.push_front(writer.source.clone());
        current = &writer.source;
    }

    current = start;
    for _ in 0..max_hops {
        let Some(reader) = graph
            .edges
            .iter()
            .find(|e| e.source == current && e.label == EdgeLabel::ReadsFrom && !visited.contains(e.target.as_str()))
        else {
            break;
        };
        visited.insert(&reader.target);
        path.push_back(reader.target.clone());
        current = &reader.target;
    }

    path.into()
}

/// [`trace_data_flow`] from every node that reads or is written to, keyed by
/// start node. Paths that never leave their start are dropped.
pub fn data_flow_paths(graph: &ProjectGraphModel, max_hops: usize) -> BTreeMap<String, Vec<String>> {
    let starts: BTreeSet<&str> = graph
        .edges
        .iter()
        .filter_map(|e| match e.label {
            EdgeLabel::ReadsFrom => Some(e.source.as_str()),
            EdgeLabel::WritesTo => Some(e.target.as_str()),
            _ => None,
        })
        .collect();
    starts
        .into_iter()
        .map(|start| (start.to_string(), trace_data_flow(graph, start, max_hops)))
        .filter(|(_, path)| path.len() > 1)
        .collect()
}

/// Counts logged at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphSummary {
    pub nodes: usize,
    pub edges: usize,
    pub nodes_by_kind: BTreeMap<String, usize>,
    pub nodes_by_layer: BTreeMap<String, usize>,
    pub edges_by_label: BTreeMap<String, usize>,
}

impl GraphSummary {
    pub fn of(graph: &ProjectGraphModel) -> Self {
        let mut summary = Self {
            nodes: graph.nodes.len(),
            edges: graph.edges.len(),
            ..Default::default()
        };
        for node in &graph.nodes {
            *summary.nodes_by_kind.entry(node.kind.clone()).or_default() += 1;
            if !node.is_container() {
                *summary.nodes_by_layer.entry(node.data.layer.to_string()).or_default() += 1;
            }
        }
        for edge in &graph.edges {
            *summary.edges_by_label.entry(edge.label.to_string()).or_default() += 1;
        }
        summary
    }

    pub fn log(&self) {
        info!(
            nodes = self.nodes,
            edges = self.edges,
            kinds = ?self.nodes_by_kind,
            layers = ?self.nodes_by_layer,
            labels = ?self.edges_by_label,
            "Graph summary"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::graph::{ProjectGraphEdge, ProjectGraphNode};

    fn graph(nodes: &[&str], edges: &[(&str, &str, EdgeLabel)]) -> ProjectGraphModel {
        ProjectGraphModel {
            nodes: nodes
                .iter()
                .map(|id| ProjectGraphNode {
                    id: id.to_string(),
                    label: id.to_string(),
                    kind: "method".into(),
                    ..Default::default()
                })
                .collect(),
            edges: edges
                .iter()
                .enumerate()
                .map(|(i, (s, t, label))| ProjectGraphEdge {
                    id: format!("e{i}"),
                    source: s.to_string(),
                    target: t.to_string(),
                    label: *label,
                })
                .collect(),
        }
    }

    #[test]
    fn degrees_follow_edges() {
        let mut g = graph(
            &["A", "B", "C"],
            &[
                ("A", "B", EdgeLabel::Calls),
                ("B", "C", EdgeLabel::Calls),
                ("A", "C", EdgeLabel::ReadsFrom),
            ],
        );
        g.nodes[0].in_degree = 7;
        calculate_node_degrees(&mut g);

        let deg = |id: &str| {
            let n = g.node(id).unwrap();
            (n.in_degree, n.out_degree)
        };
        assert_eq!(deg("A"), (0, 2));
        assert_eq!(deg("B"), (1, 1));
        assert_eq!(deg("C"), (2, 0));
    }

    #[test]
    fn data_flow_runs_both_ways() {
        let g = graph(
            &["w2", "w1", "field", "r1", "r2"],
            &[
                ("w1", "field", EdgeLabel::WritesTo),
                ("w2", "w1", EdgeLabel::WritesTo),
                ("field", "r1", EdgeLabel::ReadsFrom),
                ("r1", "r2", EdgeLabel::ReadsFrom),
            ],
        );
        assert_eq!(trace_data_flow(&g, "field", 10), ["w2", "w1", "field", "r1", "r2"]);
        assert_eq!(trace_data_flow(&g, "field", 1), ["w1", "field", "r1"]);
    }

    #[test]
    fn data_flow_is_bounded_on_cycles() {
        let ids: Vec<String> = (0..40).map(|i| format!("n{i}")).collect();
        let mut edges = Vec::new();
        for i in 0..40 {
            let next = (i + 1) % 40;
            edges.push((ids[i].as_str(), ids[next].as_str(), EdgeLabel::ReadsFrom));
            edges.push((ids[i].as_str(), ids[next].as_str(), EdgeLabel::WritesTo));
        }
        let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let g = graph(&refs, &edges);

        let path = trace_data_flow(&g, "n0", 10);
        assert_eq!(path.len(), 21);
        assert_eq!(path.iter().collect::<HashSet<_>>().len(), path.len());
    }

    #[test]
    fn data_flow_paths_start_at_readers_and_written_nodes() {
        let g = graph(
            &["w1", "field", "r1", "r2", "lonely"],
            &[
                ("w1", "field", EdgeLabel::WritesTo),
                ("field", "r1", EdgeLabel::ReadsFrom),
                ("r1", "r2", EdgeLabel::ReadsFrom),
                ("lonely", "r2", EdgeLabel::Calls),
            ],
        );
        let flows = data_flow_paths(&g, 1);
        assert_eq!(flows.keys().collect::<Vec<_>>(), ["field", "r1"]);
        assert_eq!(flows["field"], ["w1", "field", "r1"]);
        assert_eq!(flows["r1"], ["r1", "r2"]);
        assert_eq!(data_flow_paths(&g, 10)["field"], ["w1", "field", "r1", "r2"]);
    }

    #[test]
    fn summary_counts_by_label() {
        let g = graph(&["a", "b"], &[("a", "b", EdgeLabel::Calls)]);
        let s = GraphSummary::of(&g);
        assert_eq!((s.nodes, s.edges), (2, 1));
        assert_eq!(s.edges_by_label.get("CALLS"), Some(&1));
        assert_eq!(s.nodes_by_layer.get("member"), Some(&2));
    }
}
