pub mod broad_phase;
pub mod error;
pub mod tree;

pub use broad_phase::BroadPhase;
pub use common::shapes::{Aabb, Vector2};
pub use error::{TreeError, TreeResult};
pub use tree::{Config, DynamicTree, RayCastInput, NULL_NODE};
