//! Project graph model handed to the UI layer.
//!
//! Node and edge ids are plain strings. Labels serialize in SCREAMING_SNAKE
//! case; avoid renaming variants, they are part of the exported JSON.

use crate::model::{
    package::FileSource,
    span::Range,
    symbol::Access,
};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeLabel {
    Calls,
    Extends,
    Implements,
    InstanceOf,
    UsesAsType,
    ReadsFrom,
    WritesTo,
    PassesAsArgument,
}

impl Display for EdgeLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        use EdgeLabel::*;
        let s = match self {
            Calls => "CALLS",
            Extends => "EXTENDS",
            Implements => "IMPLEMENTS",
            InstanceOf => "INSTANCE_OF",
            UsesAsType => "USES_AS_TYPE",
            ReadsFrom => "READS_FROM",
            WritesTo => "WRITES_TO",
            PassesAsArgument => "PASSES_AS_ARGUMENT",
        };
        f.write_str(s)
    }
}

/// Heuristic architectural layer of a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    View,
    State,
    Service,
    Model,
    Utility,
    #[default]
    Member,
}

impl Display for Layer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Layer::View => "view",
            Layer::State => "state",
            Layer::Service => "service",
            Layer::Model => "model",
            Layer::Utility => "utility",
            Layer::Member => "member",
        };
        f.write_str(s)
    }
}

/// Node payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    pub file_id: String,
    pub range: Option<Range>,
    pub selection_range: Option<Range>,
    pub access: Option<Access>,
    pub is_sdk: bool,
    pub layer: Layer,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<FileSource>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectGraphNode {
    pub id: String,
    pub label: String,
    pub kind: String,
    pub data: NodeData,
    pub parent: Option<String>,
    pub in_degree: usize,
    pub out_degree: usize,
}

impl ProjectGraphNode {
    /// Package and project containers are synthetic and carry no symbol.
    pub fn is_container(&self) -> bool {
        self.kind == PACKAGE_CONTAINER_KIND || self.kind == PROJECT_CONTAINER_KIND
    }
}

pub const PACKAGE_CONTAINER_KIND: &str = "package_container";
pub const PROJECT_CONTAINER_KIND: &str = "project_container";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectGraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub label: EdgeLabel,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectGraphModel {
    pub nodes: Vec<ProjectGraphNode>,
    pub edges: Vec<ProjectGraphEdge>,
}

impl ProjectGraphModel {
    pub fn node(&self, id: &str) -> Option<&ProjectGraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}
