//! Hierarchy reconstruction
//!
//! Rows never name their parent. Each row is a snapshot of one root-to-node
//! path, so the insertion point has to be re-derived for every row by walking
//! down from the root and matching labels level by level.
//!
//! # Branch resolution
//!
//! [`BranchStrategy::ActiveBranch`] reproduces the historical behavior of the
//! converter: below the second level the walk does not match the direct parent
//! by label but descends into the most recently added child of the grandparent.
//! Input must therefore list the rows of a subtree contiguously, otherwise
//! deep nodes can land under the wrong sibling or the walk can miss entirely.
//!
//! [`BranchStrategy::ExactPath`] addresses every ancestor by label along the
//! row's full path and is insensitive to row order.
//!
//! Levels are numbered from 1 in errors and logs; level 1 is the root.

use crate::error::BuildError;
use crate::node::{SerializableNode, TreeNode};
use crate::table::{Level, Row};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// How the parent of a new node is located.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BranchStrategy {
    /// Descend into the most recently added child below the second level.
    #[default]
    ActiveBranch,
    /// Match every ancestor by label.
    ExactPath,
}

impl fmt::Display for BranchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchStrategy::ActiveBranch => write!(f, "active-branch"),
            BranchStrategy::ExactPath => write!(f, "exact-path"),
        }
    }
}

impl FromStr for BranchStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active-branch" => Ok(BranchStrategy::ActiveBranch),
            "exact-path" => Ok(BranchStrategy::ExactPath),
            other => Err(format!(
                "unknown branch strategy '{other}' (expected active-branch or exact-path)"
            )),
        }
    }
}

/// Appends table rows to a root node.
#[derive(Debug, Clone, Default)]
pub struct HierarchyBuilder {
    strategy: BranchStrategy,
}

impl HierarchyBuilder {
    pub fn new(strategy: BranchStrategy) -> Self {
        HierarchyBuilder { strategy }
    }

    pub fn strategy(&self) -> BranchStrategy {
        self.strategy
    }

    /// Inserts every row under `root`, in order.
    ///
    /// The first row whose level 1 label differs from the root label aborts
    /// the build. On any error the partially built tree is discarded.
    pub fn build(&self, mut root: TreeNode, rows: &[Row]) -> Result<TreeNode, BuildError> {
        for row in rows {
            if row.root_label() != root.label() {
                warn!(
                    line = row.line(),
                    expected = root.label(),
                    found = row.root_label(),
                    "row belongs to a different root"
                );
                return Err(BuildError::HierarchyMismatch {
                    line: row.line(),
                    expected: root.label().to_string(),
                    found: row.root_label().to_string(),
                });
            }
            self.insert_row(&mut root, row).inspect_err(|e| {
                warn!(line = row.line(), error = %e, "row could not be placed");
            })?;
        }
        debug!(
            rows = rows.len(),
            nodes = root.node_count(),
            strategy = %self.strategy,
            "built hierarchy"
        );
        Ok(root)
    }

    /// Same as [`build`](Self::build), returning the serializable form.
    pub fn build_serializable(
        &self,
        root: TreeNode,
        rows: &[Row],
    ) -> Result<SerializableNode, BuildError> {
        self.build(root, rows).map(|tree| tree.to_serializable())
    }

    fn insert_row(&self, root: &mut TreeNode, row: &Row) -> Result<(), BuildError> {
        let levels = populated_levels(row)?;
        debug!(line = row.line(), depth = row.depth(), "inserting row");

        match self.strategy {
            BranchStrategy::ActiveBranch => {
                for i in 0..row.depth() {
                    let parent = active_parent(root, row, &levels, i)?;
                    let new = levels[i + 1];
                    parent.get_or_create_child(new.id, new.label.as_str(), new.link.as_str());
                }
            }
            BranchStrategy::ExactPath => {
                let mut node = root;
                for level in levels.iter().skip(1) {
                    node = node.get_or_create_child(level.id, level.label.as_str(), level.link.as_str());
                }
            }
        }
        Ok(())
    }
}

/// Collects the row's levels, rejecting blank levels above populated ones.
fn populated_levels(row: &Row) -> Result<Vec<&Level>, BuildError> {
    (0..row.level_count())
        .map(|index| {
            row.level(index).ok_or(BuildError::BlankLevel {
                line: row.line(),
                level: index + 1,
            })
        })
        .collect()
}

/// Locates the node that receives level index `i + 1` of `row`.
///
/// * `i == 0`: the root itself.
/// * `i` in `1..=2`: the root child labelled like level index `i` when there
///   is one, otherwise the active branch below level index `i - 1`.
/// * deeper: the active branch below level index `i - 1`.
fn active_parent<'t>(
    root: &'t mut TreeNode,
    row: &Row,
    levels: &[&Level],
    i: usize,
) -> Result<&'t mut TreeNode, BuildError> {
    match i {
        0 => Ok(root),
        1 | 2 if root.find_child(&levels[i].label).is_some() => {
            child_by_label(root, row, levels[i], i + 2)
        }
        _ => active_branch(root, row, levels, i),
    }
}

/// Walks levels `1..=i-2` by label from the root, matches level `i - 1`, then
/// steps into that node's most recently added child.
fn active_branch<'t>(
    root: &'t mut TreeNode,
    row: &Row,
    levels: &[&Level],
    i: usize,
) -> Result<&'t mut TreeNode, BuildError> {
    let inserting = i + 2;
    let mut node = root;
    for level in levels.iter().take(i.saturating_sub(1)).skip(1) {
        node = child_by_label(node, row, level, inserting)?;
    }
    let anchor = child_by_label(node, row, levels[i - 1], inserting)?;
    let anchor_label = anchor.label().to_string();
    anchor
        .last_child_mut()
        .ok_or(BuildError::MalformedHierarchy {
            line: row.line(),
            level: inserting,
            label: anchor_label,
        })
}

fn child_by_label<'t>(
    node: &'t mut TreeNode,
    row: &Row,
    level: &Level,
    inserting: usize,
) -> Result<&'t mut TreeNode, BuildError> {
    node.find_child_mut(&level.label)
        .ok_or_else(|| BuildError::MalformedHierarchy {
            line: row.line(),
            level: inserting,
            label: level.label.clone(),
        })
}
