//! Tagged-variant document tree.
//!
//! The rendering/editing layer is an external collaborator; this tree only
//! needs to carry opaque text payloads plus the one variant that matters
//! here: `Collab`, a node holding a typed `BlockAttrs` struct and nested
//! body content.
//!
//! Positions are addressed by [`NodePath`] — child indices from the root,
//! stable as long as no structural edit lands above the node. Consumers use
//! paths for jump-to-block navigation and the transport uses them to target
//! structural ops.

use serde::{Deserialize, Serialize};

use concord_types::BlockAttrs;

/// A node in the document tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// Plain prose. Formatting is the editor's business, not ours.
    Paragraph {
        #[serde(default)]
        text: String,
    },
    /// Section heading.
    Heading {
        #[serde(default)]
        level: u8,
        #[serde(default)]
        text: String,
    },
    /// Structural container.
    Section {
        #[serde(default)]
        children: Vec<Node>,
    },
    /// A collaboration block: tracked attributes plus an opaque body.
    Collab {
        attrs: BlockAttrs,
        #[serde(default)]
        children: Vec<Node>,
    },
}

impl Node {
    /// Create a paragraph node.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Node::Paragraph { text: text.into() }
    }

    /// Create a heading node.
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Node::Heading {
            level,
            text: text.into(),
        }
    }

    /// Create a section node.
    pub fn section(children: Vec<Node>) -> Self {
        Node::Section { children }
    }

    /// Child nodes, if this variant has any.
    pub fn children(&self) -> Option<&[Node]> {
        match self {
            Node::Section { children } | Node::Collab { children, .. } => Some(children),
            _ => None,
        }
    }

    /// Mutable child nodes, if this variant has any.
    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Section { children } | Node::Collab { children, .. } => Some(children),
            _ => None,
        }
    }

    /// Block attributes, if this is a collaboration block.
    pub fn attrs(&self) -> Option<&BlockAttrs> {
        match self {
            Node::Collab { attrs, .. } => Some(attrs),
            _ => None,
        }
    }

    /// Mutable block attributes, if this is a collaboration block.
    pub(crate) fn attrs_mut(&mut self) -> Option<&mut BlockAttrs> {
        match self {
            Node::Collab { attrs, .. } => Some(attrs),
            _ => None,
        }
    }

    /// Check if this is a collaboration block.
    pub fn is_block(&self) -> bool {
        matches!(self, Node::Collab { .. })
    }

    /// Concatenated plain text of this node and its descendants, in
    /// document order. Used for excerpts — not for rendering.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Paragraph { text } | Node::Heading { text, .. } => {
                if !out.is_empty() && !text.is_empty() {
                    out.push(' ');
                }
                out.push_str(text);
            }
            Node::Section { children } | Node::Collab { children, .. } => {
                for child in children {
                    child.collect_text(out);
                }
            }
        }
    }
}

/// Stable position handle: child indices from the document root.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodePath(pub Vec<usize>);

impl NodePath {
    /// The root path (empty — addresses the document's top-level list).
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Path to the i-th top-level node.
    pub fn top(index: usize) -> Self {
        Self(vec![index])
    }

    /// Extend this path down into the i-th child.
    pub fn child(&self, index: usize) -> Self {
        let mut v = self.0.clone();
        v.push(index);
        Self(v)
    }

    /// Parent path, or None at the root.
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Last index in the path.
    pub fn leaf_index(&self) -> Option<usize> {
        self.0.last().copied()
    }

    /// Depth from the root (0 = top level).
    pub fn depth(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for NodePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return write!(f, "·");
        }
        let parts: Vec<String> = self.0.iter().map(|i| i.to_string()).collect();
        write!(f, "{}", parts.join("."))
    }
}

/// Depth-first, document-order iterator over a node forest.
///
/// Yields `(NodePath, &Node)` pairs, parents before children, siblings in
/// index order — the traversal order every aggregation consumer sees.
pub struct DepthFirst<'a> {
    stack: Vec<(NodePath, &'a Node)>,
}

impl<'a> DepthFirst<'a> {
    /// Walk the given top-level nodes.
    pub fn new(roots: &'a [Node]) -> Self {
        let stack = roots
            .iter()
            .enumerate()
            .rev()
            .map(|(i, n)| (NodePath::top(i), n))
            .collect();
        Self { stack }
    }
}

impl<'a> Iterator for DepthFirst<'a> {
    type Item = (NodePath, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let (path, node) = self.stack.pop()?;
        if let Some(children) = node.children() {
            for (i, child) in children.iter().enumerate().rev() {
                self.stack.push((path.child(i), child));
            }
        }
        Some((path, node))
    }
}

// ============================================================================
// Tests
// ============================================================================
