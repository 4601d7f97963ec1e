#![doc = r"Layout animations proxy: filters host mutation batches against in-flight entering, exiting and layout animations."]

mod animation;
mod commands;
pub mod config;
mod enterings;
mod proxy;
mod removals;
mod state;
pub mod surface;
mod transaction;
pub mod tree;

pub use animation::LayoutAnimation;
pub use config::{ConfigError, ProxyConfig};
pub use proxy::{LayoutAnimationsProxy, ProxyHandle};
pub use surface::{SurfaceManager, UpdateMap, UpdateValues};
pub use tree::{MutationTree, NodeId, NodeState, Removal, TreeNode};
