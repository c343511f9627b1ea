/// Roadmap tree to directed graph description.
///
/// Depth-first pre-order walk. Node ids are the first 8 hex characters of the SHA-256
/// of `"{parent_id}_{label}"` (or of `label` alone at the root), so the same label under
/// different parents gets different ids while repeated label+parent pairs land on the
/// same id. Groups emit no node; their contents hang off the enclosing parent one level
/// deeper. Depth only picks a fill colour.
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::roadmap::{LeafKind, RoadmapNode};

const ID_LEN: usize = 8;

/// Fill colours for branch nodes, cycled by depth.
pub const PALETTE: [&str; 8] = [
    "lightblue",
    "lightgreen",
    "lightyellow",
    "lavender",
    "peachpuff",
    "mistyrose",
    "honeydew",
    "thistle",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStyle {
    Branch,
    LeafListItem,
    LeafScalar,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub depth: usize,
    pub style: NodeStyle,
}

impl GraphNode {
    pub fn fill_color(&self) -> &'static str {
        match self.style {
            NodeStyle::Branch => PALETTE[self.depth % PALETTE.len()],
            NodeStyle::LeafListItem | NodeStyle::LeafScalar => "white",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub from_id: String,
    pub to_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoadmapGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl RoadmapGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn add_node(
        &mut self,
        parent: Option<&str>,
        label: &str,
        display: String,
        depth: usize,
        style: NodeStyle,
    ) -> String {
        let id = node_id(parent, label);
        if let Some(parent) = parent {
            self.edges.push(GraphEdge {
                from_id: parent.to_string(),
                to_id: id.clone(),
            });
        }
        self.nodes.push(GraphNode {
            id: id.clone(),
            label: display,
            depth,
            style,
        });
        id
    }
}

pub fn build_graph(root: &RoadmapNode) -> RoadmapGraph {
    let mut graph = RoadmapGraph::default();
    walk(root.children(), None, 0, &mut graph);
    graph
}

fn walk(children: &[RoadmapNode], parent: Option<&str>, depth: usize, graph: &mut RoadmapGraph) {
    for child in children {
        match child {
            RoadmapNode::Branch { label, children } => {
                let id = graph.add_node(parent, label, label.clone(), depth, NodeStyle::Branch);
                walk(children, Some(&id), depth + 1, graph);
            }
            RoadmapNode::Leaf {
                label,
                kind: LeafKind::ListItem,
            } => {
                graph.add_node(
                    parent,
                    label,
                    format!("• {label}"),
                    depth,
                    NodeStyle::LeafListItem,
                );
            }
            RoadmapNode::Leaf {
                label,
                kind: LeafKind::Scalar,
            } => {
                graph.add_node(parent, label, label.clone(), depth, NodeStyle::LeafScalar);
            }
            RoadmapNode::Group(inner) => walk(inner, parent, depth + 1, graph),
        }
    }
}

/// Short stable id for `label` under `parent`.
pub fn node_id(parent: Option<&str>, label: &str) -> String {
    let key = match parent {
        Some(parent) => format!("{parent}_{label}"),
        None => label.to_string(),
    };
    let digest = Sha256::digest(key.as_bytes());
    let mut hex = format!("{digest:x}");
    hex.truncate(ID_LEN);
    hex
}
