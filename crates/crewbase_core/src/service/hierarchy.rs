//! Role/group hierarchy resolution.
//!
//! # Responsibility
//! - Compute the descendant closure of a directory node from the flat
//!   parent-edge list.
//! - Fan out "everything under this node" queries through a caller-supplied
//!   lookup.
//!
//! # Invariants
//! - The closure always includes the starting node and contains each id at
//!   most once.
//! - Resolution terminates even when edits have introduced a parent cycle.

use crate::repo::directory_repo::NodeEdge;
use std::collections::{BTreeMap, HashSet, VecDeque};

/// Returns the starting node plus every node transitively below it.
///
/// Builds an adjacency map (parent id to child ids) from the flat edge
/// list, then walks it breadth-first with a visited-set guard. An unknown
/// starting id yields an empty closure rather than an error. Ids come back
/// in traversal order, children of one parent sorted ascending.
pub fn descendant_closure(edges: &[NodeEdge], root: i64) -> Vec<i64> {
    if !edges.iter().any(|edge| edge.id == root) {
        return Vec::new();
    }

    let mut children: BTreeMap<i64, Vec<i64>> = BTreeMap::new();
    for edge in edges {
        if let Some(parent_id) = edge.parent_id {
            children.entry(parent_id).or_default().push(edge.id);
        }
    }
    for ids in children.values_mut() {
        ids.sort_unstable();
    }

    let mut closure = Vec::new();
    let mut visited = HashSet::new();
    let mut frontier = VecDeque::from([root]);
    while let Some(current) = frontier.pop_front() {
        if !visited.insert(current) {
            continue;
        }
        closure.push(current);

        if let Some(ids) = children.get(&current) {
            for &child in ids {
                if !visited.contains(&child) {
                    frontier.push_back(child);
                }
            }
        }
    }

    closure
}

/// Fetches every entity attached to the closure rooted at `root`.
///
/// `fetch` receives the closure ids and is expected to run an
/// `IN (...)` style query. It is not invoked when the closure is empty.
pub fn entities_under<T, E>(
    edges: &[NodeEdge],
    root: i64,
    fetch: impl FnOnce(&[i64]) -> Result<Vec<T>, E>,
) -> Result<Vec<T>, E> {
    let closure = descendant_closure(edges, root);
    if closure.is_empty() {
        return Ok(Vec::new());
    }
    fetch(&closure)
}

#[cfg(test)]
mod tests {
    use super::{descendant_closure, entities_under};
    use crate::repo::directory_repo::NodeEdge;

    fn edge(id: i64, parent_id: Option<i64>) -> NodeEdge {
        NodeEdge { id, parent_id }
    }

    #[test]
    fn closure_covers_every_level_of_a_deep_tree() {
        let edges = vec![
            edge(1, None),
            edge(2, Some(1)),
            edge(3, Some(1)),
            edge(4, Some(2)),
            edge(5, Some(4)),
            edge(6, None),
        ];

        let mut closure = descendant_closure(&edges, 1);
        closure.sort_unstable();
        assert_eq!(closure, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn closure_of_a_leaf_is_just_the_leaf() {
        let edges = vec![edge(1, None), edge(2, Some(1))];
        assert_eq!(descendant_closure(&edges, 2), vec![2]);
    }

    #[test]
    fn unknown_root_yields_empty_closure() {
        let edges = vec![edge(1, None), edge(2, Some(1))];
        assert!(descendant_closure(&edges, 99).is_empty());
    }

    #[test]
    fn parent_cycle_terminates_with_each_node_once() {
        let edges = vec![edge(1, Some(2)), edge(2, Some(1)), edge(3, Some(2))];

        let mut closure = descendant_closure(&edges, 1);
        closure.sort_unstable();
        assert_eq!(closure, vec![1, 2, 3]);
    }

    #[test]
    fn self_loop_terminates() {
        let edges = vec![edge(1, Some(1)), edge(2, Some(1))];

        let mut closure = descendant_closure(&edges, 1);
        closure.sort_unstable();
        assert_eq!(closure, vec![1, 2]);
    }

    #[test]
    fn entities_under_skips_fetch_for_unknown_root() {
        let edges = vec![edge(1, None)];
        let result: Result<Vec<i64>, ()> = entities_under(&edges, 42, |_| {
            panic!("fetch must not run for an empty closure")
        });
        assert_eq!(result, Ok(Vec::new()));
    }

    #[test]
    fn entities_under_passes_closure_ids_to_fetch() {
        let edges = vec![edge(1, None), edge(2, Some(1))];
        let result: Result<Vec<i64>, ()> = entities_under(&edges, 1, |ids| {
            let mut ids = ids.to_vec();
            ids.sort_unstable();
            assert_eq!(ids, vec![1, 2]);
            Ok(vec![100])
        });
        assert_eq!(result, Ok(vec![100]));
    }
}
