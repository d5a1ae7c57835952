use common::shapes::{Aabb, Vector2};
use smallvec::SmallVec;

pub const NULL_NODE: u32 = u32::MAX;

pub(crate) const TRAVERSAL_STACK_INLINE: usize = 64;

// Traversals never recurse; depth is bounded by the node count, not the
// inline capacity, so deep trees spill to the heap instead of the call stack.
pub(crate) type TraversalStack = SmallVec<[u32; TRAVERSAL_STACK_INLINE]>;

#[derive(Debug, Copy, Clone)]
pub(crate) struct TreeNode {
    pub(crate) aabb: Aabb,
    // Parent while the slot is live, next free slot while it is pooled.
    pub(crate) parent_or_next: u32,
    pub(crate) child1: u32,
    pub(crate) child2: u32,
    // leaf = 0, free slot = -1
    pub(crate) height: i32,
    pub(crate) value: u32,
}

impl TreeNode {
    pub(crate) fn free_slot(next: u32) -> Self {
        Self {
            aabb: Aabb::default(),
            parent_or_next: next,
            child1: NULL_NODE,
            child2: NULL_NODE,
            height: -1,
            value: 0,
        }
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.child1 == NULL_NODE
    }
}

// The ray extends from p1 to p1 + max_fraction * (p2 - p1).
#[derive(Debug, Copy, Clone)]
pub struct RayCastInput {
    pub p1: Vector2,
    pub p2: Vector2,
    pub max_fraction: f32,
}
