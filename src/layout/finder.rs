//! Search helpers over the editor's split-window tree.
//!
//! Editors describe their split layout as nested rows and columns of windows.
//! `WinLayoutFinder` flattens that tree into an arena so nodes can point at
//! their parents, which makes "closest window" searches cheap.

use std::collections::{HashSet, VecDeque};

use crate::host::WindowId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SplitKind {
    /// Children laid out side by side.
    Row,
    /// Children stacked vertically.
    Col,
}

/// Split tree as reported by the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutNode {
    Leaf(WindowId),
    Group {
        kind: SplitKind,
        children: Vec<LayoutNode>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentRef {
    pub group: NodeId,
    pub index_in_parent: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Leaf(WindowId),
    Group(SplitKind),
}

#[derive(Debug, Clone)]
struct ArenaNode {
    kind: NodeKind,
    parent: Option<ParentRef>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct WinLayoutFinder {
    nodes: Vec<ArenaNode>,
}

impl WinLayoutFinder {
    pub fn new(root: &LayoutNode) -> Self {
        let mut finder = Self { nodes: Vec::new() };
        finder.push(root, None);
        finder
    }

    fn push(&mut self, node: &LayoutNode, parent: Option<ParentRef>) -> NodeId {
        let id = NodeId(self.nodes.len());
        let kind = match node {
            LayoutNode::Leaf(window) => NodeKind::Leaf(*window),
            LayoutNode::Group { kind, .. } => NodeKind::Group(*kind),
        };
        self.nodes.push(ArenaNode {
            kind,
            parent,
            children: Vec::new(),
        });
        if let LayoutNode::Group { children, .. } = node {
            let ids: Vec<NodeId> = children
                .iter()
                .enumerate()
                .map(|(index_in_parent, child)| {
                    self.push(
                        child,
                        Some(ParentRef {
                            group: id,
                            index_in_parent,
                        }),
                    )
                })
                .collect();
            self.nodes[id.0].children = ids;
        }
        id
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn kind(&self, node: NodeId) -> NodeKind {
        self.nodes[node.0].kind
    }

    pub fn parent(&self, node: NodeId) -> Option<ParentRef> {
        self.nodes[node.0].parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    /// Leaf showing `window`, searched depth-first from `begin`.
    pub fn find_from(&self, window: WindowId, begin: NodeId) -> Option<NodeId> {
        match self.kind(begin) {
            NodeKind::Leaf(id) => (id == window).then_some(begin),
            NodeKind::Group(_) => self
                .children(begin)
                .iter()
                .find_map(|child| self.find_from(window, *child)),
        }
    }

    pub fn find(&self, window: WindowId) -> Option<NodeId> {
        self.find_from(window, self.root())
    }

    /// First window reached by always descending into the first child.
    /// `None` only for an empty group.
    pub fn first_leaf(&self, node: NodeId) -> Option<WindowId> {
        match self.kind(node) {
            NodeKind::Leaf(id) => Some(id),
            NodeKind::Group(_) => self
                .children(node)
                .first()
                .and_then(|child| self.first_leaf(*child)),
        }
    }

    /// Breadth-first walk outward from `begin`, through children first and
    /// then parents, returning the first leaf whose window is in `candidates`.
    pub fn find_closest(&self, begin: NodeId, candidates: &[WindowId]) -> Option<NodeId> {
        let mut checked = HashSet::from([begin]);
        let mut queue = VecDeque::from([begin]);
        while let Some(node) = queue.pop_front() {
            match self.kind(node) {
                NodeKind::Leaf(id) if candidates.contains(&id) => return Some(node),
                NodeKind::Leaf(_) => {}
                NodeKind::Group(_) => {
                    for child in self.children(node) {
                        if checked.insert(*child) {
                            queue.push_back(*child);
                        }
                    }
                }
            }
            if let Some(parent) = self.parent(node)
                && checked.insert(parent.group)
            {
                queue.push_back(parent.group);
            }
        }
        None
    }
}
