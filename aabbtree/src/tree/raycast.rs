use common::shapes::{Aabb, Vector2};

use super::types::TraversalStack;
use super::{DynamicTree, RayCastInput, NULL_NODE};
use crate::error::{TreeError, TreeResult};

impl DynamicTree {
    // Casts the segment from p1 to p1 + max_fraction * (p2 - p1) against the
    // stored fat boxes. The callback sees each candidate leaf and returns a
    // fraction: 0 ends the cast, a positive fraction below the current one
    // clips the segment there, anything else leaves the segment alone.
    pub fn ray_cast<F>(&self, input: &RayCastInput, mut callback: F) -> TreeResult<()>
    where
        F: FnMut(&RayCastInput, u32) -> f32,
    {
        let p1 = input.p1;
        let p2 = input.p2;
        let r = p2 - p1;
        if r.length_squared() <= 0.0 {
            return Err(TreeError::ZeroLengthSegment { x: p1.x, y: p1.y });
        }
        let r = r.normalized();

        // v is perpendicular to the segment.
        let v = r.perp();
        let abs_v = v.abs();

        let mut max_fraction = input.max_fraction;
        let mut segment_aabb = segment_bounds(p1, p2, max_fraction);

        let mut stack = TraversalStack::new();
        stack.push(self.root);

        while let Some(node_id) = stack.pop() {
            if node_id == NULL_NODE {
                continue;
            }

            let node = &self.nodes[node_id as usize];
            if !node.aabb.overlaps(&segment_aabb) {
                continue;
            }

            // Separating axis: |dot(v, p1 - c)| > dot(|v|, h).
            let c = node.aabb.center();
            let h = node.aabb.extents();
            let separation = v.dot(p1 - c).abs() - abs_v.dot(h);
            if separation > 0.0 {
                continue;
            }

            if node.is_leaf() {
                let sub_input = RayCastInput {
                    p1: input.p1,
                    p2: input.p2,
                    max_fraction,
                };
                let fraction = callback(&sub_input, node_id);

                if fraction == 0.0 {
                    // The callback ended the cast.
                    return Ok(());
                }
                if fraction > 0.0 && fraction < max_fraction {
                    // Clip the segment; far subtrees stop qualifying.
                    max_fraction = fraction;
                    segment_aabb = segment_bounds(p1, p2, max_fraction);
                }
            } else {
                stack.push(node.child1);
                stack.push(node.child2);
            }
        }

        Ok(())
    }
}

fn segment_bounds(p1: Vector2, p2: Vector2, max_fraction: f32) -> Aabb {
    let t = p1 + max_fraction * (p2 - p1);
    Aabb::new(p1.min(t), p1.max(t))
}
