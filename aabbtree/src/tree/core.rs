use common::shapes::{Aabb, Vector2};

use super::types::TreeNode;
use super::{Config, DynamicTree, NULL_NODE};
use crate::error::{TreeError, TreeResult};

impl DynamicTree {
    pub fn new() -> Self {
        Self::new_with_config(Config::default())
    }

    pub fn new_with_config(config: Config) -> Self {
        let capacity = config.initial_capacity.max(1);
        let mut nodes = Vec::with_capacity(capacity);
        for i in 0..capacity {
            let next = if i + 1 < capacity {
                (i + 1) as u32
            } else {
                NULL_NODE
            };
            nodes.push(TreeNode::free_slot(next));
        }
        Self {
            nodes,
            root: NULL_NODE,
            free_list: 0,
            node_count: 0,
            config,
        }
    }

    pub fn node_count(&self) -> u32 {
        self.node_count
    }

    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    pub fn height(&self) -> i32 {
        if self.root == NULL_NODE {
            return 0;
        }
        self.nodes[self.root as usize].height
    }

    pub fn value(&self, proxy: u32) -> u32 {
        let node = &self.nodes[proxy as usize];
        debug_assert!(node.height >= 0, "proxy addresses a free slot");
        node.value
    }

    pub fn fat_aabb(&self, proxy: u32) -> Aabb {
        let node = &self.nodes[proxy as usize];
        debug_assert!(node.height >= 0, "proxy addresses a free slot");
        node.aabb
    }

    pub fn create_proxy(&mut self, aabb: Aabb, value: u32) -> TreeResult<u32> {
        if !aabb.is_valid() {
            return Err(TreeError::InvalidAabb {
                min_x: aabb.lower.x,
                min_y: aabb.lower.y,
                max_x: aabb.upper.x,
                max_y: aabb.upper.y,
            });
        }

        let proxy = self.allocate_node();
        let node = &mut self.nodes[proxy as usize];
        node.aabb = aabb.extended(self.config.aabb_extension);
        node.value = value;
        node.height = 0;

        self.insert_leaf(proxy);
        Ok(proxy)
    }

    pub fn destroy_proxy(&mut self, proxy: u32) {
        assert!((proxy as usize) < self.nodes.len());
        let node = &self.nodes[proxy as usize];
        assert!(node.height >= 0, "proxy already destroyed");
        assert!(node.is_leaf(), "proxy must address a leaf");

        self.remove_leaf(proxy);
        self.free_node(proxy);
    }

    // Returns whether the leaf was re-inserted. A tight box still inside the
    // stored fat box leaves the tree untouched.
    pub fn move_proxy(
        &mut self,
        proxy: u32,
        aabb: Aabb,
        displacement: Vector2,
    ) -> TreeResult<bool> {
        assert!((proxy as usize) < self.nodes.len());
        assert!(self.nodes[proxy as usize].height >= 0, "proxy already destroyed");
        assert!(self.nodes[proxy as usize].is_leaf(), "proxy must address a leaf");

        if !aabb.is_valid() {
            return Err(TreeError::InvalidAabb {
                min_x: aabb.lower.x,
                min_y: aabb.lower.y,
                max_x: aabb.upper.x,
                max_y: aabb.upper.y,
            });
        }

        if self.nodes[proxy as usize].aabb.contains(&aabb) {
            return Ok(false);
        }

        self.remove_leaf(proxy);

        let mut fat = aabb.extended(self.config.aabb_extension);

        // Stretch toward where the box is heading.
        let d = self.config.aabb_multiplier * displacement;
        if d.x < 0.0 {
            fat.lower.x += d.x;
        } else {
            fat.upper.x += d.x;
        }
        if d.y < 0.0 {
            fat.lower.y += d.y;
        } else {
            fat.upper.y += d.y;
        }

        self.nodes[proxy as usize].aabb = fat;
        self.insert_leaf(proxy);
        Ok(true)
    }

    pub(crate) fn allocate_node(&mut self) -> u32 {
        if self.free_list == NULL_NODE {
            self.grow();
        }

        let node_id = self.free_list;
        let node = &mut self.nodes[node_id as usize];
        self.free_list = node.parent_or_next;
        node.parent_or_next = NULL_NODE;
        node.child1 = NULL_NODE;
        node.child2 = NULL_NODE;
        node.height = 0;
        node.value = 0;
        self.node_count += 1;
        node_id
    }

    fn grow(&mut self) {
        debug_assert!(self.node_count as usize == self.nodes.len());

        // Double the pool and chain the new slots into the free list.
        let old_capacity = self.nodes.len();
        let new_capacity = old_capacity * 2;
        self.nodes.reserve(new_capacity - old_capacity);
        for i in old_capacity..new_capacity {
            let next = if i + 1 < new_capacity {
                i as u32 + 1
            } else {
                NULL_NODE
            };
            self.nodes.push(TreeNode::free_slot(next));
        }
        self.free_list = old_capacity as u32;
    }

    pub(crate) fn free_node(&mut self, node_id: u32) {
        debug_assert!((node_id as usize) < self.nodes.len());
        debug_assert!(self.node_count > 0);
        let node = &mut self.nodes[node_id as usize];
        node.parent_or_next = self.free_list;
        node.height = -1;
        self.free_list = node_id;
        self.node_count -= 1;
    }

    pub(crate) fn insert_leaf(&mut self, leaf: u32) {
        if self.root == NULL_NODE {
            self.root = leaf;
            self.nodes[leaf as usize].parent_or_next = NULL_NODE;
            return;
        }

        // Walk down to the sibling whose pairing grows total perimeter least.
        let leaf_aabb = self.nodes[leaf as usize].aabb;
        let mut index = self.root;
        while !self.nodes[index as usize].is_leaf() {
            let child1 = self.nodes[index as usize].child1;
            let child2 = self.nodes[index as usize].child2;

            let area = self.nodes[index as usize].aabb.perimeter();
            let combined_area = self.nodes[index as usize]
                .aabb
                .union(&leaf_aabb)
                .perimeter();

            // Cost of pairing the leaf with this whole subtree.
            let cost = 2.0 * combined_area;

            // Minimum cost of pushing the leaf further down.
            let inheritance_cost = 2.0 * (combined_area - area);

            let cost1 = self.descend_cost(child1, &leaf_aabb, inheritance_cost);
            let cost2 = self.descend_cost(child2, &leaf_aabb, inheritance_cost);

            if cost < cost1 && cost < cost2 {
                break;
            }

            // Ties descend into child2.
            index = if cost1 < cost2 { child1 } else { child2 };
        }

        let sibling = index;

        // Splice a fresh parent into the sibling's place.
        let old_parent = self.nodes[sibling as usize].parent_or_next;
        let sibling_height = self.nodes[sibling as usize].height;
        let combined = leaf_aabb.union(&self.nodes[sibling as usize].aabb);
        let new_parent = self.allocate_node();
        {
            let node = &mut self.nodes[new_parent as usize];
            node.parent_or_next = old_parent;
            node.aabb = combined;
            node.height = sibling_height + 1;
        }

        if old_parent != NULL_NODE {
            if self.nodes[old_parent as usize].child1 == sibling {
                self.nodes[old_parent as usize].child1 = new_parent;
            } else {
                self.nodes[old_parent as usize].child2 = new_parent;
            }
        } else {
            self.root = new_parent;
        }
        self.nodes[new_parent as usize].child1 = sibling;
        self.nodes[new_parent as usize].child2 = leaf;
        self.nodes[sibling as usize].parent_or_next = new_parent;
        self.nodes[leaf as usize].parent_or_next = new_parent;

        // Walk back up fixing heights and bounds.
        let mut index = self.nodes[leaf as usize].parent_or_next;
        while index != NULL_NODE {
            index = self.balance(index);
            self.refresh_node(index);
            index = self.nodes[index as usize].parent_or_next;
        }
    }

    fn descend_cost(&self, child: u32, leaf_aabb: &Aabb, inheritance_cost: f32) -> f32 {
        let node = &self.nodes[child as usize];
        let combined = node.aabb.union(leaf_aabb);
        if node.is_leaf() {
            combined.perimeter() + inheritance_cost
        } else {
            combined.perimeter() - node.aabb.perimeter() + inheritance_cost
        }
    }

    pub(crate) fn remove_leaf(&mut self, leaf: u32) {
        if leaf == self.root {
            self.root = NULL_NODE;
            return;
        }

        let parent = self.nodes[leaf as usize].parent_or_next;
        let grand_parent = self.nodes[parent as usize].parent_or_next;
        let sibling = if self.nodes[parent as usize].child1 == leaf {
            self.nodes[parent as usize].child2
        } else {
            self.nodes[parent as usize].child1
        };

        if grand_parent != NULL_NODE {
            // Splice the sibling over the parent.
            if self.nodes[grand_parent as usize].child1 == parent {
                self.nodes[grand_parent as usize].child1 = sibling;
            } else {
                self.nodes[grand_parent as usize].child2 = sibling;
            }
            self.nodes[sibling as usize].parent_or_next = grand_parent;
            self.free_node(parent);

            let mut index = grand_parent;
            while index != NULL_NODE {
                index = self.balance(index);
                self.refresh_node(index);
                index = self.nodes[index as usize].parent_or_next;
            }
        } else {
            self.root = sibling;
            self.nodes[sibling as usize].parent_or_next = NULL_NODE;
            self.free_node(parent);
        }
    }

    fn refresh_node(&mut self, index: u32) {
        let child1 = self.nodes[index as usize].child1;
        let child2 = self.nodes[index as usize].child2;
        debug_assert!(child1 != NULL_NODE);
        debug_assert!(child2 != NULL_NODE);
        let height = 1 + self.nodes[child1 as usize]
            .height
            .max(self.nodes[child2 as usize].height);
        let aabb = self.nodes[child1 as usize]
            .aabb
            .union(&self.nodes[child2 as usize].aabb);
        let node = &mut self.nodes[index as usize];
        node.height = height;
        node.aabb = aabb;
    }

    // One rotation restoring |height(child2) - height(child1)| <= 1 at `ia`.
    // Callers run it at every ancestor on the way up, which keeps the whole
    // tree within the balance bound. Returns the subtree's new root.
    pub(crate) fn balance(&mut self, ia: u32) -> u32 {
        debug_assert!(ia != NULL_NODE);

        let a = &self.nodes[ia as usize];
        if a.is_leaf() || a.height < 2 {
            return ia;
        }

        let ib = a.child1;
        let ic = a.child2;
        debug_assert!((ib as usize) < self.nodes.len());
        debug_assert!((ic as usize) < self.nodes.len());

        let balance = self.nodes[ic as usize].height - self.nodes[ib as usize].height;
        if balance > 1 {
            return self.rotate_up(ia, ic, ib);
        }
        if balance < -1 {
            return self.rotate_up(ia, ib, ic);
        }
        ia
    }

    // Promotes child `ix` of `ia` one level up; `io` is the other child.
    fn rotate_up(&mut self, ia: u32, ix: u32, io: u32) -> u32 {
        let promoted_child2 = self.nodes[ia as usize].child2 == ix;
        let if_ = self.nodes[ix as usize].child1;
        let ig = self.nodes[ix as usize].child2;
        debug_assert!((if_ as usize) < self.nodes.len());
        debug_assert!((ig as usize) < self.nodes.len());

        // Swap ia and ix.
        let a_parent = self.nodes[ia as usize].parent_or_next;
        self.nodes[ix as usize].child1 = ia;
        self.nodes[ix as usize].parent_or_next = a_parent;
        self.nodes[ia as usize].parent_or_next = ix;

        // ia's old parent should point to ix.
        if a_parent != NULL_NODE {
            if self.nodes[a_parent as usize].child1 == ia {
                self.nodes[a_parent as usize].child1 = ix;
            } else {
                debug_assert!(self.nodes[a_parent as usize].child2 == ia);
                self.nodes[a_parent as usize].child2 = ix;
            }
        } else {
            self.root = ix;
        }

        // ix keeps its taller child; the shorter one moves under ia.
        let (keep, give) =
            if self.nodes[if_ as usize].height > self.nodes[ig as usize].height {
                (if_, ig)
            } else {
                (ig, if_)
            };
        self.nodes[ix as usize].child2 = keep;
        if promoted_child2 {
            self.nodes[ia as usize].child2 = give;
        } else {
            self.nodes[ia as usize].child1 = give;
        }
        self.nodes[give as usize].parent_or_next = ia;

        let a_aabb = self.nodes[io as usize]
            .aabb
            .union(&self.nodes[give as usize].aabb);
        let a_height = 1 + self.nodes[io as usize]
            .height
            .max(self.nodes[give as usize].height);
        self.nodes[ia as usize].aabb = a_aabb;
        self.nodes[ia as usize].height = a_height;

        let x_aabb = a_aabb.union(&self.nodes[keep as usize].aabb);
        let x_height = 1 + a_height.max(self.nodes[keep as usize].height);
        self.nodes[ix as usize].aabb = x_aabb;
        self.nodes[ix as usize].height = x_height;

        ix
    }
}
