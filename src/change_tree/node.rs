use crate::model::{FileStatus, StatusMarker};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Leaf,
    Directory { children: Vec<TreeNode> },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeNode {
    /// Unique within the forest: `prefix/rel_path`, or `rel_path` without a prefix.
    pub key: String,
    /// Display segment.
    pub name: String,
    /// Cumulative path relative to the tree root; the status lookup key.
    pub rel_path: String,
    /// Own status tag. Usually only set on leaves.
    pub status: Option<FileStatus>,
    /// Own status or any descendant's status.
    pub changed: bool,
    pub kind: NodeKind,
}

impl TreeNode {
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf)
    }

    pub fn children(&self) -> &[TreeNode] {
        match &self.kind {
            NodeKind::Leaf => &[],
            NodeKind::Directory { children } => children,
        }
    }

    /// Only leaves carrying a status get a marker; directories never do.
    pub fn marker(&self) -> Option<StatusMarker> {
        if !self.is_leaf() {
            return None;
        }
        self.status.map(FileStatus::marker)
    }
}
