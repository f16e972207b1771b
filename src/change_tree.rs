//! Hierarchical change view over a flat path listing.
//!
//! The backend reports the deployed configuration as a flat list of
//! repository-relative paths plus a sparse `path -> status` map. This module
//! turns that into a sorted forest where every node knows whether anything in
//! its subtree changed, optionally pruned to changed subtrees only. The forest
//! is rebuilt from scratch on every fetch; nothing here mutates in place.

mod build;
mod collate;
mod node;
mod rows;

pub use self::build::build;
pub use self::collate::locale_cmp;
pub use self::node::{NodeKind, TreeNode};
pub use self::rows::{VisibleRow, changed_leaf_count, find_node, flatten_visible, leaf_keys};
