mod config;
mod core;
mod maintenance;
mod query;
mod raycast;
mod types;

pub use config::Config;
pub use types::{RayCastInput, NULL_NODE};

use types::TreeNode;

pub struct DynamicTree {
    nodes: Vec<TreeNode>,
    root: u32,
    free_list: u32,
    node_count: u32,
    config: Config,
}

impl Default for DynamicTree {
    fn default() -> Self {
        Self::new()
    }
}
