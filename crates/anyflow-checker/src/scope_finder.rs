//! Finding the function that lexically encloses a node.

use crate::node::{NodeArena, NodeIndex};
use anyflow_common::limits::MAX_TREE_WALK_ITERATIONS;

/// Find the enclosing function for a given node.
///
/// Traverses up the tree to the first function-like node (declaration,
/// expression, arrow, method). The node itself counts when it is
/// function-like.
///
/// Returns `None` at file scope, for unknown nodes, or when the parent
/// chain is longer than `MAX_TREE_WALK_ITERATIONS`.
pub fn find_enclosing_function(arena: &NodeArena, idx: NodeIndex) -> Option<NodeIndex> {
    let mut current = idx;
    let mut iterations = 0;
    while !current.is_none() {
        iterations += 1;
        if iterations > MAX_TREE_WALK_ITERATIONS {
            return None;
        }
        if let Some(node) = arena.get(current)
            && node.is_function_like()
        {
            return Some(current);
        }
        let ext = arena.get_extended(current)?;
        if ext.parent.is_none() {
            return None;
        }
        current = ext.parent;
    }
    None
}

#[cfg(test)]
#[path = "../tests/scope_finder_tests.rs"]
mod tests;
