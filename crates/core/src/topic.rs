//! Topic Tree Nodes
//!
//! A topic tree is a labeled hierarchy of study material. Every node is one of
//! three explicit shapes:
//!
//! - `Category`: a pure grouping of refinements with nothing of its own to show.
//! - `Leaf`: an explanation (and optionally a snippet) with no further choices.
//! - `Hybrid`: an explanation that is also an intermediate stop, so the learner
//!   can read it and still descend into its refinements.
//!
//! On disk a node is the loose `{content, code, children}` object the catalog
//! is authored in; the shape is derived once at load time and validated.

use crate::error::NodeShapeError;
use serde::{Deserialize, Serialize, Serializer, ser::SerializeMap};
use std::collections::BTreeMap;

/// Labeled refinements of a node. Labels are unique among siblings and are
/// exposed in lexical order.
pub type Children = BTreeMap<String, TopicNode>;

/// A single node of a topic tree.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawTopicNode")]
pub enum TopicNode {
    Category {
        children: Children,
    },
    Leaf {
        content: String,
        code: Option<String>,
    },
    Hybrid {
        content: String,
        code: Option<String>,
        children: Children,
    },
}

/// The shape tag of a [`TopicNode`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Category,
    Leaf,
    Hybrid,
}

impl TopicNode {
    pub fn category(children: Children) -> Self {
        TopicNode::Category { children }
    }

    pub fn leaf(content: impl Into<String>, code: Option<String>) -> Self {
        TopicNode::Leaf {
            content: content.into(),
            code,
        }
    }

    pub fn hybrid(content: impl Into<String>, code: Option<String>, children: Children) -> Self {
        TopicNode::Hybrid {
            content: content.into(),
            code,
            children,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            TopicNode::Category { .. } => NodeKind::Category,
            TopicNode::Leaf { .. } => NodeKind::Leaf,
            TopicNode::Hybrid { .. } => NodeKind::Hybrid,
        }
    }

    /// The node's own explanation, if it has one.
    pub fn content(&self) -> Option<&str> {
        match self {
            TopicNode::Category { .. } => None,
            TopicNode::Leaf { content, .. } | TopicNode::Hybrid { content, .. } => Some(content),
        }
    }

    /// The node's illustrative snippet, if it has one.
    pub fn code(&self) -> Option<&str> {
        match self {
            TopicNode::Category { .. } => None,
            TopicNode::Leaf { code, .. } | TopicNode::Hybrid { code, .. } => code.as_deref(),
        }
    }

    pub fn children(&self) -> Option<&Children> {
        match self {
            TopicNode::Leaf { .. } => None,
            TopicNode::Category { children } | TopicNode::Hybrid { children, .. } => {
                Some(children)
            }
        }
    }

    pub fn child(&self, label: &str) -> Option<&TopicNode> {
        self.children().and_then(|children| children.get(label))
    }

    /// Labels of the refinements reachable from this node.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.children()
            .into_iter()
            .flat_map(|children| children.keys().map(String::as_str))
    }

    pub fn is_leaf(&self) -> bool {
        self.children().is_none_or(|children| children.is_empty())
    }

    /// Returns a deep copy with every `code` snippet removed, at every depth.
    ///
    /// Node shapes and labels are preserved, so a `Leaf` stays a `Leaf` even
    /// when it loses its snippet.
    pub fn pruned(&self) -> TopicNode {
        match self {
            TopicNode::Category { children } => TopicNode::Category {
                children: prune_children(children),
            },
            TopicNode::Leaf { content, .. } => TopicNode::Leaf {
                content: content.clone(),
                code: None,
            },
            TopicNode::Hybrid {
                content, children, ..
            } => TopicNode::Hybrid {
                content: content.clone(),
                code: None,
                children: prune_children(children),
            },
        }
    }

    /// Whether this node or any descendant carries a code snippet.
    pub fn contains_code(&self) -> bool {
        self.code().is_some()
            || self
                .children()
                .is_some_and(|children| children.values().any(TopicNode::contains_code))
    }

    /// Total number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self
            .children()
            .map_or(0, |children| children.values().map(TopicNode::node_count).sum())
    }

    /// Length of the longest label path below this node.
    pub fn depth(&self) -> usize {
        self.children()
            .and_then(|children| children.values().map(|c| 1 + c.depth()).max())
            .unwrap_or(0)
    }
}

fn prune_children(children: &Children) -> Children {
    children
        .iter()
        .map(|(label, node)| (label.clone(), node.pruned()))
        .collect()
}

// Serializes back into the authored `{content, code, children}` object,
// omitting whatever the node does not carry.
impl Serialize for TopicNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let children = self.children().filter(|children| !children.is_empty());
        let len = usize::from(self.content().is_some())
            + usize::from(self.code().is_some())
            + usize::from(children.is_some());

        let mut map = serializer.serialize_map(Some(len))?;
        if let Some(content) = self.content() {
            map.serialize_entry("content", content)?;
        }
        if let Some(code) = self.code() {
            map.serialize_entry("code", code)?;
        }
        if let Some(children) = children {
            map.serialize_entry("children", children)?;
        }
        map.end()
    }
}

/// The authored, unvalidated form of a node.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTopicNode {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    children: Children,
}

impl TryFrom<RawTopicNode> for TopicNode {
    type Error = NodeShapeError;

    fn try_from(raw: RawTopicNode) -> Result<Self, Self::Error> {
        if raw.children.keys().any(|label| label.trim().is_empty()) {
            return Err(NodeShapeError::BlankLabel);
        }
        if raw.content.as_deref().is_some_and(|c| c.trim().is_empty()) {
            return Err(NodeShapeError::BlankContent);
        }

        match (raw.content, raw.code, raw.children.is_empty()) {
            (None, Some(_), _) => Err(NodeShapeError::CodeWithoutContent),
            (None, None, true) => Err(NodeShapeError::Empty),
            (None, None, false) => Ok(TopicNode::Category {
                children: raw.children,
            }),
            (Some(content), code, true) => Ok(TopicNode::Leaf { content, code }),
            (Some(content), code, false) => Ok(TopicNode::Hybrid {
                content,
                code,
                children: raw.children,
            }),
        }
    }
}
