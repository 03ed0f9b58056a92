use std::fmt::{Display, Formatter};
use std::rc::Rc;
use std::str::FromStr;

use formloom_core::Ufid;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::mug_type::MugTypeRef;
use crate::ports::MovePolicy;

/// Which of the form's two hierarchies a tree maintains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeKind {
    /// Persisted data layout.
    Data,
    /// UI control layout.
    Control,
}

impl TreeKind {
    /// Returns stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Data => "data",
            Self::Control => "control",
        }
    }
}

/// Placement of an inserted mug type relative to a reference node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    /// Immediately before the reference among its siblings.
    Before,
    /// Immediately after the reference among its siblings.
    After,
    /// As last child of the reference.
    Into,
    /// As first child of the reference.
    First,
    /// As last child of the reference.
    Last,
}

impl Position {
    /// Returns stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::After => "after",
            Self::Into => "into",
            Self::First => "first",
            Self::Last => "last",
        }
    }
}

impl FromStr for Position {
    type Err = ModelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "before" => Ok(Self::Before),
            "after" => Ok(Self::After),
            "into" => Ok(Self::Into),
            "first" => Ok(Self::First),
            "last" => Ok(Self::Last),
            _ => Err(ModelError::InvalidArgument(format!(
                "position must be 'before', 'after', 'into', 'first' or 'last', got '{value}'"
            ))),
        }
    }
}

/// Index of a node in a tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(usize);

impl Display for NodeId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[derive(Debug)]
struct Node {
    value: Option<MugTypeRef>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Ordered N-ary tree over mug types.
///
/// Nodes live in an arena indexed by [`NodeId`]; the synthetic root sits
/// at index zero and holds no value. Each node stores its parent index,
/// so parent queries cost O(1). Detached slots are not reclaimed; they
/// simply become unreachable from the root.
#[derive(Debug)]
pub struct Tree {
    kind: TreeKind,
    nodes: Vec<Node>,
}

impl Tree {
    /// Creates an empty tree of the given kind.
    #[must_use]
    pub fn new(kind: TreeKind) -> Self {
        Self {
            kind,
            nodes: vec![Node {
                value: None,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Returns which hierarchy this tree maintains.
    #[must_use]
    pub fn kind(&self) -> TreeKind {
        self.kind
    }

    /// Returns the synthetic root node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Returns the mug type held by a node (`None` for the root).
    #[must_use]
    pub fn value(&self, id: NodeId) -> Option<MugTypeRef> {
        self.node(id).value.clone()
    }

    /// Returns a node's children in order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Returns a node's parent; the root is its own parent.
    #[must_use]
    pub fn parent_node(&self, id: NodeId) -> NodeId {
        self.node(id).parent.unwrap_or(id)
    }

    /// Walks the tree depth-first from the root, in child order.
    fn depth_first(&self) -> Vec<NodeId> {
        let mut ordered = Vec::new();
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            ordered.push(id);
            for child in self.node(id).children.iter().rev() {
                stack.push(*child);
            }
        }
        ordered
    }

    /// Finds the node holding the given mug type, by identity.
    #[must_use]
    pub fn node_from_mug_type(&self, mug_type: &MugTypeRef) -> Option<NodeId> {
        self.depth_first().into_iter().find(|id| {
            self.node(*id)
                .value
                .as_ref()
                .is_some_and(|value| Rc::ptr_eq(value, mug_type))
        })
    }

    /// Finds a mug type in this tree by stable identifier: its own, or
    /// its attached mug's.
    #[must_use]
    pub fn mug_type_from_ufid(&self, ufid: Ufid) -> Option<MugTypeRef> {
        self.depth_first().into_iter().find_map(|id| {
            self.node(id)
                .value
                .as_ref()
                .filter(|value| {
                    let mug_type = value.borrow();
                    mug_type.ufid() == ufid
                        || mug_type.mug().is_some_and(|mug| mug.ufid() == ufid)
                })
                .cloned()
        })
    }

    /// Returns the mug type held by the parent of the given mug type's
    /// node, or `None` when the parent is the synthetic root (or the
    /// mug type is not in this tree).
    #[must_use]
    pub fn parent_mug_type(&self, mug_type: &MugTypeRef) -> Option<MugTypeRef> {
        let id = self.node_from_mug_type(mug_type)?;
        self.node(self.parent_node(id)).value.clone()
    }

    /// Returns the mug types directly under the synthetic root, in order.
    #[must_use]
    pub fn root_children(&self) -> Vec<MugTypeRef> {
        self.node(self.root())
            .children
            .iter()
            .filter_map(|child| self.node(*child).value.clone())
            .collect()
    }

    /// Inserts a mug type at a position relative to a reference mug type.
    ///
    /// A mug type already present is detached first (its subtree intact)
    /// and re-inserted: a move, never a duplicate. `position` defaults to
    /// [`Position::After`]; a `None` reference forces [`Position::Into`]
    /// against the root. The move policy is consulted before anything is
    /// touched, so a failed insert leaves the tree unchanged.
    pub fn insert_mug_type(
        &mut self,
        mug_type: &MugTypeRef,
        position: Option<Position>,
        reference: Option<&MugTypeRef>,
        policy: &dyn MovePolicy,
    ) -> ModelResult<NodeId> {
        let (position, reference) = match reference {
            None => (Position::Into, None),
            Some(reference) => (position.unwrap_or(Position::After), Some(reference)),
        };

        if !policy.check_move(mug_type, position, reference) {
            tracing::warn!(
                tree = self.kind.as_str(),
                position = position.as_str(),
                mug_type = %mug_type.borrow(),
                "move rejected by policy"
            );
            return Err(ModelError::IllegalMove(format!(
                "move to position '{}' rejected by the move policy",
                position.as_str()
            )));
        }

        let reference_node = match reference {
            None => self.root(),
            Some(reference) => {
                if Rc::ptr_eq(reference, mug_type) {
                    return Err(ModelError::IllegalMove(
                        "cannot insert a mug type relative to itself".to_owned(),
                    ));
                }
                self.node_from_mug_type(reference).ok_or_else(|| {
                    ModelError::NullNode("reference mug type is not in this tree".to_owned())
                })?
            }
        };

        let node = match self.node_from_mug_type(mug_type) {
            Some(existing) => {
                if self.is_in_subtree(reference_node, existing) {
                    return Err(ModelError::IllegalMove(
                        "cannot move a mug type into its own subtree".to_owned(),
                    ));
                }
                self.detach(existing);
                existing
            }
            None => {
                self.nodes.push(Node {
                    value: Some(Rc::clone(mug_type)),
                    parent: None,
                    children: Vec::new(),
                });
                NodeId(self.nodes.len() - 1)
            }
        };

        match position {
            Position::Before | Position::After => {
                let parent = self.parent_node(reference_node);
                let index = self
                    .node(parent)
                    .children
                    .iter()
                    .position(|sibling| *sibling == reference_node)
                    .unwrap_or(self.node(parent).children.len());
                let offset = usize::from(position == Position::After);
                self.attach(parent, node, index + offset);
            }
            Position::Into | Position::Last => {
                let end = self.node(reference_node).children.len();
                self.attach(reference_node, node, end);
            }
            Position::First => self.attach(reference_node, node, 0),
        }

        Ok(node)
    }

    /// Detaches the node holding the given mug type, subtree and all.
    ///
    /// Returns the detached node, or `None` (a no-op) when the mug type
    /// is not in this tree.
    pub fn remove_mug_type(&mut self, mug_type: &MugTypeRef) -> Option<NodeId> {
        let node = self.node_from_mug_type(mug_type)?;
        self.detach(node);
        Some(node)
    }

    /// Returns the absolute path of a mug type: the display identifiers
    /// of its ancestors and itself, root-most first, `/`-separated and
    /// excluding the synthetic root.
    pub fn absolute_path(&self, mug_type: &MugTypeRef) -> ModelResult<String> {
        let mut id = self.node_from_mug_type(mug_type).ok_or_else(|| {
            ModelError::NullNode("cannot compute the path of a mug type not in this tree".to_owned())
        })?;

        let mut segments = vec![self.node_label(id)];
        loop {
            let parent = self.parent_node(id);
            if parent == id || parent == self.root() {
                break;
            }
            segments.push(self.node_label(parent));
            id = parent;
        }
        segments.reverse();

        Ok(format!("/{}", segments.join("/")))
    }

    /// Returns the display identifier used for a node in paths and in
    /// the pretty-printed tree.
    #[must_use]
    pub fn node_label(&self, id: NodeId) -> String {
        if id == self.root() {
            return "RootNode".to_owned();
        }

        let label = self.node(id).value.as_ref().and_then(|value| {
            let mug_type = value.borrow();
            let mug = mug_type.mug()?;
            match self.kind {
                TreeKind::Data => mug.data_element_id().map(ToOwned::to_owned),
                TreeKind::Control => mug.display_name().map(ToOwned::to_owned),
            }
        });

        label.unwrap_or_else(|| "(unnamed)".to_owned())
    }

    /// Produces the bracketed nested-list diagnostic representation,
    /// e.g. `RootNode[question1,question2[question3]]`.
    #[must_use]
    pub fn print_tree(&self) -> String {
        self.pretty(self.root())
    }

    fn pretty(&self, id: NodeId) -> String {
        let children = &self.node(id).children;
        if children.is_empty() {
            return self.node_label(id);
        }
        let printed: Vec<String> = children.iter().map(|child| self.pretty(*child)).collect();
        format!("{}[{}]", self.node_label(id), printed.join(","))
    }

    fn is_in_subtree(&self, id: NodeId, subtree_root: NodeId) -> bool {
        let mut stack = vec![subtree_root];
        while let Some(current) = stack.pop() {
            if current == id {
                return true;
            }
            stack.extend(self.node(current).children.iter().copied());
        }
        false
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.node(id).parent {
            self.node_mut(parent).children.retain(|child| *child != id);
        }
        self.node_mut(id).parent = None;
    }

    fn attach(&mut self, parent: NodeId, node: NodeId, index: usize) {
        let end = self.node(parent).children.len();
        self.node_mut(parent).children.insert(index.min(end), node);
        self.node_mut(node).parent = Some(parent);
    }
}
