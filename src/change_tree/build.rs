use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use crate::model::FileStatus;

use super::collate::locale_cmp;
use super::node::{NodeKind, TreeNode};

#[derive(Debug)]
struct RawNode {
    rel_path: String,
    is_leaf: bool,
    children: BTreeMap<String, RawNode>,
}

/// Builds the display forest for one tree listing.
///
/// With `show_all == false` every subtree without a status anywhere inside it
/// is dropped whole. Siblings are ordered changed-first, then by
/// [`locale_cmp`] on the raw segment name. Empty or segment-less paths
/// contribute nothing.
/// A path listed both as a file and as a folder (`a` and `a/b.conf`) becomes a
/// folder holding the deeper entries.
pub fn build<I, S>(
    prefix: &str,
    paths: I,
    statuses: &HashMap<String, FileStatus>,
    show_all: bool,
) -> Vec<TreeNode>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut root = BTreeMap::new();
    for path in paths {
        insert(&mut root, path.as_ref());
    }
    assemble(prefix, root, statuses, show_all).0
}

fn insert(root: &mut BTreeMap<String, RawNode>, path: &str) {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let mut level = root;
    let mut rel_path = String::new();
    for (idx, seg) in segments.iter().enumerate() {
        let is_leaf = idx + 1 == segments.len();
        if !rel_path.is_empty() {
            rel_path.push('/');
        }
        rel_path.push_str(seg);

        let node = level.entry((*seg).to_string()).or_insert_with(|| RawNode {
            rel_path: rel_path.clone(),
            is_leaf,
            children: BTreeMap::new(),
        });
        // A deeper path running through an existing leaf turns it into a directory.
        if !is_leaf {
            node.is_leaf = false;
        }
        level = &mut node.children;
    }
}

fn assemble(
    prefix: &str,
    level: BTreeMap<String, RawNode>,
    statuses: &HashMap<String, FileStatus>,
    show_all: bool,
) -> (Vec<TreeNode>, bool) {
    let mut nodes = Vec::with_capacity(level.len());
    let mut any_changed = false;

    for (name, raw) in level {
        let status = statuses.get(&raw.rel_path).copied();
        let (kind, child_changed) = if raw.is_leaf {
            (NodeKind::Leaf, false)
        } else {
            let (children, changed) = assemble(prefix, raw.children, statuses, show_all);
            (NodeKind::Directory { children }, changed)
        };

        let changed = status.is_some() || child_changed;
        any_changed |= changed;
        if !show_all && !changed {
            continue;
        }

        nodes.push(TreeNode {
            key: node_key(prefix, &raw.rel_path),
            name,
            rel_path: raw.rel_path,
            status,
            changed,
            kind,
        });
    }

    nodes.sort_by(sibling_order);
    (nodes, any_changed)
}

fn sibling_order(a: &TreeNode, b: &TreeNode) -> Ordering {
    b.changed
        .cmp(&a.changed)
        .then_with(|| locale_cmp(&a.name, &b.name))
}

fn node_key(prefix: &str, rel_path: &str) -> String {
    if prefix.is_empty() {
        rel_path.to_string()
    } else {
        format!("{}/{}", prefix, rel_path)
    }
}

#[cfg(test)]
#[path = "../tests/change_tree/build_tests.rs"]
mod tests;
