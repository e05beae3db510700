//! Menu tree nodes
//!
//! A [`TreeNode`] is one entry of the pick menu. Nodes own their children and
//! siblings are addressed by label only: [`TreeNode::get_or_create_child`]
//! never creates a second child with a label that is already present.

use serde::{Deserialize, Serialize};

/// One entry in the menu hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    id: i64,
    label: String,
    link: String,
    children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn new(id: i64, label: impl Into<String>, link: impl Into<String>) -> Self {
        TreeNode {
            id,
            label: label.into(),
            link: link.into(),
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    /// Direct children in the order they were first seen.
    pub fn children(&self) -> &[TreeNode] {
        &self.children
    }

    /// Returns the child labelled `label`, creating it if absent.
    ///
    /// On a hit the existing child is returned untouched: its id and link are
    /// never overwritten by later rows.
    pub fn get_or_create_child(
        &mut self,
        id: i64,
        label: impl Into<String>,
        link: impl Into<String>,
    ) -> &mut TreeNode {
        let label = label.into();
        match self.children.iter().position(|c| c.label == label) {
            Some(index) => &mut self.children[index],
            None => {
                self.children.push(TreeNode::new(id, label, link));
                let last = self.children.len() - 1;
                &mut self.children[last]
            }
        }
    }

    pub fn find_child(&self, label: &str) -> Option<&TreeNode> {
        self.children.iter().find(|c| c.label == label)
    }

    pub fn find_child_mut(&mut self, label: &str) -> Option<&mut TreeNode> {
        self.children.iter_mut().find(|c| c.label == label)
    }

    /// The most recently added child, i.e. the branch currently being filled.
    pub fn last_child_mut(&mut self) -> Option<&mut TreeNode> {
        self.children.last_mut()
    }

    /// Total number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(TreeNode::node_count).sum::<usize>()
    }

    /// Number of levels in this subtree; a leaf has depth 1.
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(TreeNode::depth).max().unwrap_or(0)
    }

    /// Converts the subtree into its plain serializable record.
    pub fn to_serializable(&self) -> SerializableNode {
        SerializableNode {
            id: self.id,
            link: self.link.clone(),
            label: self.label.clone(),
            children: self.children.iter().map(TreeNode::to_serializable).collect(),
        }
    }

    /// Rebuilds a tree from a serialized record, keeping child order.
    pub fn from_serializable(node: SerializableNode) -> Self {
        TreeNode {
            id: node.id,
            label: node.label,
            link: node.link,
            children: node
                .children
                .into_iter()
                .map(TreeNode::from_serializable)
                .collect(),
        }
    }
}

/// The on-disk shape of a menu entry.
///
/// Field order matches the written output: `id`, `link`, `label`, `children`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableNode {
    pub id: i64,
    pub link: String,
    pub label: String,
    pub children: Vec<SerializableNode>,
}
