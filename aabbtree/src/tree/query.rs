use common::shapes::Aabb;

use super::types::TraversalStack;
use super::{DynamicTree, NULL_NODE};

impl DynamicTree {
    // Calls `callback` for every leaf whose fat box overlaps `aabb`.
    // Returning false aborts the whole traversal. The callback must not
    // mutate this tree.
    pub fn query<F>(&self, aabb: &Aabb, mut callback: F)
    where
        F: FnMut(u32) -> bool,
    {
        let mut stack = TraversalStack::new();
        stack.push(self.root);

        while let Some(node_id) = stack.pop() {
            if node_id == NULL_NODE {
                continue;
            }

            let node = &self.nodes[node_id as usize];
            if !node.aabb.overlaps(aabb) {
                continue;
            }

            if node.is_leaf() {
                if !callback(node_id) {
                    return;
                }
            } else {
                stack.push(node.child1);
                stack.push(node.child2);
            }
        }
    }
}
