/// Typed roadmap tree built from the LLM's untyped JSON.
///
/// Object keys become `Branch` nodes. Array items that are scalars become `ListItem`
/// leaves under the enclosing branch; array items that are themselves objects or arrays
/// become `Group`s, which never produce a graph node but push their contents one level
/// deeper. A scalar where a branch body was expected becomes a `Scalar` leaf.
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafKind {
    /// A scalar element of a JSON array.
    ListItem,
    /// A bare scalar value of an object key.
    Scalar,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RoadmapNode {
    Branch {
        label: String,
        children: Vec<RoadmapNode>,
    },
    Leaf {
        label: String,
        kind: LeafKind,
    },
    /// Object or array nested directly inside an array.
    Group(Vec<RoadmapNode>),
}

impl RoadmapNode {
    /// The unlabeled root with no children.
    pub fn empty() -> Self {
        RoadmapNode::Branch {
            label: String::new(),
            children: Vec::new(),
        }
    }

    /// Root node wrapping the value found under the `"roadmap"` key.
    pub fn from_value(value: &Value) -> Self {
        RoadmapNode::Branch {
            label: String::new(),
            children: children_of(value),
        }
    }

    pub fn children(&self) -> &[RoadmapNode] {
        match self {
            RoadmapNode::Branch { children, .. } | RoadmapNode::Group(children) => {
                children.as_slice()
            }
            RoadmapNode::Leaf { .. } => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.children().is_empty()
    }

    /// Counts `(branches, list items, scalars)` below this node, excluding itself.
    pub fn count_descendants(&self) -> (usize, usize, usize) {
        let mut counts = (0, 0, 0);
        for child in self.children() {
            match child {
                RoadmapNode::Branch { .. } => counts.0 += 1,
                RoadmapNode::Leaf {
                    kind: LeafKind::ListItem,
                    ..
                } => counts.1 += 1,
                RoadmapNode::Leaf {
                    kind: LeafKind::Scalar,
                    ..
                } => counts.2 += 1,
                RoadmapNode::Group(_) => {}
            }
            let (b, l, s) = child.count_descendants();
            counts.0 += b;
            counts.1 += l;
            counts.2 += s;
        }
        counts
    }
}

fn children_of(value: &Value) -> Vec<RoadmapNode> {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| RoadmapNode::Branch {
                label: key.trim().to_string(),
                children: children_of(value),
            })
            .collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::Object(_) | Value::Array(_) => Some(RoadmapNode::Group(children_of(item))),
                scalar => scalar_label(scalar).map(|label| RoadmapNode::Leaf {
                    label,
                    kind: LeafKind::ListItem,
                }),
            })
            .collect(),
        scalar => scalar_label(scalar)
            .map(|label| RoadmapNode::Leaf {
                label,
                kind: LeafKind::Scalar,
            })
            .into_iter()
            .collect(),
    }
}

/// Trimmed display text of a scalar; `None` for null and blank strings.
fn scalar_label(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Object(_) | Value::Array(_) => return None,
    };
    (!text.is_empty()).then_some(text)
}
