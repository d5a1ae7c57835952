use common::shapes::Vector2;

use super::{DynamicTree, NULL_NODE};

impl DynamicTree {
    // Rebuilds an optimal tree by repeatedly pairing the two entries whose
    // union has the smallest perimeter. O(n^2) per pass; offline use only.
    pub fn rebuild_bottom_up(&mut self) {
        let mut entries: Vec<u32> = Vec::with_capacity(self.node_count as usize);

        // Keep the leaves, free the internal nodes.
        for i in 0..self.nodes.len() {
            if self.nodes[i].height < 0 {
                continue;
            }
            if self.nodes[i].is_leaf() {
                self.nodes[i].parent_or_next = NULL_NODE;
                entries.push(i as u32);
            } else {
                self.free_node(i as u32);
            }
        }

        let mut count = entries.len();
        if count == 0 {
            self.root = NULL_NODE;
            return;
        }

        while count > 1 {
            let mut min_cost = f32::MAX;
            let mut i_min = 0usize;
            let mut j_min = 0usize;
            for i in 0..count {
                let aabb_i = self.nodes[entries[i] as usize].aabb;
                for j in (i + 1)..count {
                    let aabb_j = self.nodes[entries[j] as usize].aabb;
                    let cost = aabb_i.union(&aabb_j).perimeter();
                    if cost < min_cost {
                        i_min = i;
                        j_min = j;
                        min_cost = cost;
                    }
                }
            }

            let index1 = entries[i_min];
            let index2 = entries[j_min];
            let height = 1 + self.nodes[index1 as usize]
                .height
                .max(self.nodes[index2 as usize].height);
            let aabb = self.nodes[index1 as usize]
                .aabb
                .union(&self.nodes[index2 as usize].aabb);

            let parent = self.allocate_node();
            {
                let node = &mut self.nodes[parent as usize];
                node.child1 = index1;
                node.child2 = index2;
                node.height = height;
                node.aabb = aabb;
                node.parent_or_next = NULL_NODE;
            }
            self.nodes[index1 as usize].parent_or_next = parent;
            self.nodes[index2 as usize].parent_or_next = parent;

            entries[j_min] = entries[count - 1];
            entries[i_min] = parent;
            count -= 1;
        }

        self.root = entries[0];

        #[cfg(debug_assertions)]
        self.validate();
    }

    // The shift formula is: position -= new_origin. Free slots shift too;
    // their bounds are never read.
    pub fn shift_origin(&mut self, new_origin: Vector2) {
        for node in &mut self.nodes {
            node.aabb = node.aabb.translated(-new_origin);
        }
    }

    pub fn compute_height(&self) -> i32 {
        if self.root == NULL_NODE {
            return 0;
        }
        self.compute_height_from(self.root)
    }

    fn compute_height_from(&self, node_id: u32) -> i32 {
        debug_assert!((node_id as usize) < self.nodes.len());
        let node = &self.nodes[node_id as usize];
        if node.is_leaf() {
            return 0;
        }
        let height1 = self.compute_height_from(node.child1);
        let height2 = self.compute_height_from(node.child2);
        1 + height1.max(height2)
    }

    // Largest height difference between any internal node's children.
    pub fn max_balance(&self) -> i32 {
        let mut max_balance = 0;
        for node in &self.nodes {
            if node.height <= 1 {
                continue;
            }
            debug_assert!(!node.is_leaf());
            let balance = (self.nodes[node.child2 as usize].height
                - self.nodes[node.child1 as usize].height)
                .abs();
            max_balance = max_balance.max(balance);
        }
        max_balance
    }

    // Sum of all live node perimeters over the root perimeter.
    pub fn perimeter_ratio(&self) -> f32 {
        if self.root == NULL_NODE {
            return 0.0;
        }

        let root_perimeter = self.nodes[self.root as usize].aabb.perimeter();
        let mut total = 0.0;
        for node in &self.nodes {
            if node.height < 0 {
                continue;
            }
            total += node.aabb.perimeter();
        }
        total / root_perimeter
    }

    // Recomputes every structural invariant from scratch. Test/debug only.
    pub fn validate(&self) {
        self.validate_structure(self.root);
        self.validate_metrics(self.root);

        let mut free_count = 0u32;
        let mut free_index = self.free_list;
        while free_index != NULL_NODE {
            assert!((free_index as usize) < self.nodes.len());
            free_index = self.nodes[free_index as usize].parent_or_next;
            free_count += 1;
        }

        assert_eq!(self.height(), self.compute_height());
        assert_eq!(self.node_count + free_count, self.nodes.len() as u32);
    }

    fn validate_structure(&self, index: u32) {
        if index == NULL_NODE {
            return;
        }

        if index == self.root {
            assert_eq!(self.nodes[index as usize].parent_or_next, NULL_NODE);
        }

        let node = &self.nodes[index as usize];
        let child1 = node.child1;
        let child2 = node.child2;

        if node.is_leaf() {
            assert_eq!(child1, NULL_NODE);
            assert_eq!(child2, NULL_NODE);
            assert_eq!(node.height, 0);
            return;
        }

        assert!((child1 as usize) < self.nodes.len());
        assert!((child2 as usize) < self.nodes.len());
        assert_eq!(self.nodes[child1 as usize].parent_or_next, index);
        assert_eq!(self.nodes[child2 as usize].parent_or_next, index);

        self.validate_structure(child1);
        self.validate_structure(child2);
    }

    fn validate_metrics(&self, index: u32) {
        if index == NULL_NODE {
            return;
        }

        let node = &self.nodes[index as usize];
        let child1 = node.child1;
        let child2 = node.child2;

        if node.is_leaf() {
            return;
        }

        let height1 = self.nodes[child1 as usize].height;
        let height2 = self.nodes[child2 as usize].height;
        assert_eq!(node.height, 1 + height1.max(height2));

        let aabb = self.nodes[child1 as usize]
            .aabb
            .union(&self.nodes[child2 as usize].aabb);
        assert_eq!(node.aabb.lower, aabb.lower);
        assert_eq!(node.aabb.upper, aabb.upper);

        self.validate_metrics(child1);
        self.validate_metrics(child2);
    }
}
