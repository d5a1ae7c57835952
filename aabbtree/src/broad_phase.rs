use common::shapes::{Aabb, Vector2};
use fxhash::FxHashSet;

use crate::error::TreeResult;
use crate::tree::{Config, DynamicTree};

// Per-step pair generation: remembers which proxies moved since the last
// pass and reports each overlapping candidate pair once.
pub struct BroadPhase {
    tree: DynamicTree,
    moved: Vec<u32>,
    moved_flags: Vec<bool>,
    pair_set: FxHashSet<u64>,
}

impl BroadPhase {
    pub fn new() -> Self {
        Self::new_with_config(Config::default())
    }

    pub fn new_with_config(config: Config) -> Self {
        Self {
            tree: DynamicTree::new_with_config(config),
            moved: Vec::new(),
            moved_flags: Vec::new(),
            pair_set: FxHashSet::default(),
        }
    }

    pub fn tree(&self) -> &DynamicTree {
        &self.tree
    }

    pub fn create_proxy(&mut self, aabb: Aabb, value: u32) -> TreeResult<u32> {
        let proxy = self.tree.create_proxy(aabb, value)?;
        self.buffer_move(proxy);
        Ok(proxy)
    }

    pub fn destroy_proxy(&mut self, proxy: u32) {
        self.unbuffer_move(proxy);
        self.tree.destroy_proxy(proxy);
    }

    pub fn move_proxy(
        &mut self,
        proxy: u32,
        aabb: Aabb,
        displacement: Vector2,
    ) -> TreeResult<bool> {
        let reinserted = self.tree.move_proxy(proxy, aabb, displacement)?;
        if reinserted {
            self.buffer_move(proxy);
        }
        Ok(reinserted)
    }

    // Forces the proxy into the next pair pass without moving it.
    pub fn touch_proxy(&mut self, proxy: u32) {
        self.buffer_move(proxy);
    }

    // Reports every candidate pair involving a proxy that moved since the
    // last pass, lower proxy id first, each pair at most once. Clears the
    // moved set.
    pub fn update_pairs<F>(&mut self, mut callback: F)
    where
        F: FnMut(u32, u32),
    {
        self.pair_set.clear();

        for i in 0..self.moved.len() {
            let proxy = self.moved[i];
            let still_buffered = self
                .moved_flags
                .get(proxy as usize)
                .copied()
                .unwrap_or(false);
            if !still_buffered {
                // Destroyed after it was buffered.
                continue;
            }

            let fat = self.tree.fat_aabb(proxy);
            let tree = &self.tree;
            let pair_set = &mut self.pair_set;
            tree.query(&fat, |other| {
                if other == proxy {
                    return true;
                }
                let (a, b) = if proxy < other {
                    (proxy, other)
                } else {
                    (other, proxy)
                };
                let key = (u64::from(a) << 32) | u64::from(b);
                if pair_set.insert(key) {
                    callback(a, b);
                }
                true
            });
        }

        for i in 0..self.moved.len() {
            let proxy = self.moved[i] as usize;
            if let Some(flag) = self.moved_flags.get_mut(proxy) {
                *flag = false;
            }
        }
        self.moved.clear();
    }

    fn buffer_move(&mut self, proxy: u32) {
        let idx = proxy as usize;
        if self.moved_flags.len() <= idx {
            self.moved_flags.resize(idx + 1, false);
        }
        if self.moved_flags[idx] {
            return;
        }
        self.moved_flags[idx] = true;
        self.moved.push(proxy);
    }

    fn unbuffer_move(&mut self, proxy: u32) {
        // Stale ids left in `moved` are skipped by the flag check.
        let idx = proxy as usize;
        if idx < self.moved_flags.len() {
            self.moved_flags[idx] = false;
        }
    }
}

impl Default for BroadPhase {
    fn default() -> Self {
        Self::new()
    }
}
