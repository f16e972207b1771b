use std::collections::HashSet;

use super::node::TreeNode;

/// One on-screen row of the file tree.
#[derive(Clone, Copy, Debug)]
pub struct VisibleRow<'a> {
    pub node: &'a TreeNode,
    pub depth: usize,
}

fn fold_with_depth<'a, B, F>(node: &'a TreeNode, depth: usize, f: &F) -> B
where
    F: Fn(&'a TreeNode, usize, Vec<B>) -> B,
{
    let child_results = node
        .children()
        .iter()
        .map(|child| fold_with_depth(child, depth + 1, f))
        .collect();
    f(node, depth, child_results)
}

/// Pre-order rows; children of a directory whose key is in `collapsed` are hidden.
pub fn flatten_visible<'a>(forest: &'a [TreeNode], collapsed: &HashSet<String>) -> Vec<VisibleRow<'a>> {
    forest
        .iter()
        .flat_map(|root| {
            fold_with_depth(root, 0, &|node, depth, child_rows: Vec<Vec<VisibleRow<'a>>>| {
                let mut rows = vec![VisibleRow { node, depth }];
                if !collapsed.contains(&node.key) {
                    rows.extend(child_rows.into_iter().flatten());
                }
                rows
            })
        })
        .collect()
}

pub fn find_node<'a>(forest: &'a [TreeNode], key: &str) -> Option<&'a TreeNode> {
    forest.iter().find_map(|root| {
        if root.key == key {
            Some(root)
        } else {
            find_node(root.children(), key)
        }
    })
}

pub fn changed_leaf_count(forest: &[TreeNode]) -> usize {
    forest
        .iter()
        .map(|root| {
            fold_with_depth(root, 0, &|node, _, counts: Vec<usize>| {
                let own = usize::from(node.is_leaf() && node.status.is_some());
                own + counts.into_iter().sum::<usize>()
            })
        })
        .sum()
}

/// Keys of every leaf, in display order.
pub fn leaf_keys(forest: &[TreeNode]) -> Vec<&str> {
    flatten_visible(forest, &HashSet::new())
        .into_iter()
        .filter(|row| row.node.is_leaf())
        .map(|row| row.node.key.as_str())
        .collect()
}
